// SPDX-License-Identifier: MIT

//! The published contract surface: the only host functions linked into a
//! world-code `Store`. A function world code tries to import that is not
//! registered here fails instantiation outright — there is no allowlist
//! to bypass at the WebAssembly level, the policy is enforced by what is
//! simply never wired up.

use wasmtime::{Caller, Engine, Linker, Memory};

use crate::host::HostContext;

const MODULE: &str = "jitrealm";

fn memory<T>(caller: &mut Caller<'_, T>) -> Option<Memory> {
    caller.get_export("memory")?.into_memory()
}

fn read_str<T>(caller: &mut Caller<'_, T>, ptr: i32, len: i32) -> String {
    let Some(mem) = memory(caller) else {
        return String::new();
    };
    let (ptr, len) = (ptr as usize, len.max(0) as usize);
    let data = mem.data(caller);
    data.get(ptr..ptr + len)
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .unwrap_or_default()
}

fn write_buf<T>(caller: &mut Caller<'_, T>, ptr: i32, cap: i32, payload: &[u8]) -> i32 {
    if payload.len() as i32 > cap {
        return -2;
    }
    let Some(mem) = memory(caller) else {
        return -2;
    };
    let ptr = ptr as usize;
    if mem.write(caller, ptr, payload).is_err() {
        return -2;
    }
    payload.len() as i32
}

/// Builds a `Linker` with every host function world code may call. Generic
/// over `T: HostContext` so the same linker shape serves every instance —
/// only the `Store`'s data (the per-instance `HostContext` impl) differs.
pub fn build_linker<T: HostContext>(engine: &Engine) -> anyhow::Result<Linker<T>> {
    let mut linker = Linker::new(engine);

    linker.func_wrap(
        MODULE,
        "state_get",
        |mut caller: Caller<'_, T>, key_ptr: i32, key_len: i32, out_ptr: i32, out_cap: i32| -> i32 {
            let key = read_str(&mut caller, key_ptr, key_len);
            match caller.data_mut().state_get(&key) {
                Some(value) => write_buf(&mut caller, out_ptr, out_cap, value.as_bytes()),
                None => -1,
            }
        },
    )?;

    linker.func_wrap(
        MODULE,
        "state_set",
        |mut caller: Caller<'_, T>, key_ptr: i32, key_len: i32, val_ptr: i32, val_len: i32| {
            let key = read_str(&mut caller, key_ptr, key_len);
            let value = read_str(&mut caller, val_ptr, val_len);
            caller.data_mut().state_set(&key, value);
        },
    )?;

    linker.func_wrap(
        MODULE,
        "state_has",
        |mut caller: Caller<'_, T>, key_ptr: i32, key_len: i32| -> i32 {
            let key = read_str(&mut caller, key_ptr, key_len);
            i32::from(caller.data_mut().state_has(&key))
        },
    )?;

    linker.func_wrap(
        MODULE,
        "is_in_room",
        |mut caller: Caller<'_, T>, id_ptr: i32, id_len: i32| -> i32 {
            let other = read_str(&mut caller, id_ptr, id_len);
            i32::from(caller.data_mut().is_in_room(&other))
        },
    )?;

    linker.func_wrap(
        MODULE,
        "log",
        |mut caller: Caller<'_, T>, msg_ptr: i32, msg_len: i32| {
            let message = read_str(&mut caller, msg_ptr, msg_len);
            caller.data_mut().log(&message);
        },
    )?;

    linker.func_wrap(MODULE, "now_ms", |mut caller: Caller<'_, T>| -> i64 {
        caller.data_mut().now_ms() as i64
    })?;

    linker.func_wrap(MODULE, "prev_reload_ms", |mut caller: Caller<'_, T>| -> i64 {
        caller
            .data_mut()
            .prev_reload_ms()
            .map(|ms| ms as i64)
            .unwrap_or(-1)
    })?;

    linker.func_wrap(MODULE, "room_event_kind", |mut caller: Caller<'_, T>| -> i32 {
        caller.data_mut().room_event_kind().unwrap_or(-1)
    })?;

    linker.func_wrap(
        MODULE,
        "room_event_actor",
        |mut caller: Caller<'_, T>, out_ptr: i32, out_cap: i32| -> i32 {
            match caller.data_mut().room_event_actor() {
                Some(actor) => write_buf(&mut caller, out_ptr, out_cap, actor.as_bytes()),
                None => -1,
            }
        },
    )?;

    linker.func_wrap(
        MODULE,
        "room_event_message",
        |mut caller: Caller<'_, T>, out_ptr: i32, out_cap: i32| -> i32 {
            match caller.data_mut().room_event_message() {
                Some(message) => write_buf(&mut caller, out_ptr, out_cap, message.as_bytes()),
                None => -1,
            }
        },
    )?;

    linker.func_wrap(
        MODULE,
        "schedule_callout",
        |mut caller: Caller<'_, T>,
         method_ptr: i32,
         method_len: i32,
         after_ms: i64,
         repeat: i32,
         interval_ms: i64| {
            let method = read_str(&mut caller, method_ptr, method_len);
            caller.data_mut().schedule_callout(
                &method,
                after_ms.max(0) as u64,
                repeat != 0,
                interval_ms.max(0) as u64,
            );
        },
    )?;

    Ok(linker)
}
