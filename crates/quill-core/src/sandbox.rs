//! Sandboxed evaluation of dynamic snippet code.
//!
//! User code is a Lua expression evaluating to a function of one argument,
//! the matched text. The function must return a string, a number, or a
//! coroutine that eventually produces one. Evaluation runs on a worker
//! thread raced against a hard deadline; on timeout the worker is abandoned,
//! and an instruction-count hook inside the VM aborts it shortly after so a
//! runaway loop cannot pin a core forever.

use mlua::{HookTriggers, Lua, Thread, ThreadStatus, Value};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// How many VM instructions run between deadline checks.
pub const INSTRUCTION_HOOK_INTERVAL: u32 = 4096;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("Used snippet code is not a function")]
    NotAFunction,
    #[error("Snippet evaluation failed: {0}")]
    Evaluation(String),
    #[error("Snippet returned invalid type, expected a string or number, got {0}")]
    InvalidReturnType(String),
    #[error("Function timed out after {0} ms of inactivity")]
    Timeout(u64),
}

/// Evaluate `code` against `matched` under `timeout`.
///
/// Every failure mode maps to an [`EvalError`]; nothing panics across this
/// boundary. A worker that outlives the timeout keeps running in the
/// background with no further effect until the VM hook stops it.
pub fn evaluate(matched: &str, code: &str, timeout: Duration) -> Result<String, EvalError> {
    let matched = matched.to_string();
    let code = code.to_string();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let outcome = run_in_vm(&matched, &code, timeout);
        // Receiver is gone when the caller already timed out; the outcome is
        // simply discarded.
        let _ = tx.send(outcome);
    });

    match rx.recv_timeout(timeout) {
        Ok(outcome) => outcome,
        Err(_) => {
            debug!(timeout_ms = timeout.as_millis() as u64, "abandoning snippet evaluation");
            Err(EvalError::Timeout(timeout.as_millis() as u64))
        }
    }
}

fn run_in_vm(matched: &str, code: &str, budget: Duration) -> Result<String, EvalError> {
    let lua = Lua::new();

    let started = Instant::now();
    lua.set_hook(
        HookTriggers::new().every_nth_instruction(INSTRUCTION_HOOK_INTERVAL),
        move |_lua, _debug| {
            if started.elapsed() > budget {
                Err(mlua::Error::RuntimeError(
                    "snippet exceeded its time budget".to_string(),
                ))
            } else {
                Ok(())
            }
        },
    );

    let function = match lua
        .load(code)
        .set_name("snippet")
        .eval::<Value>()
        .map_err(|err| EvalError::Evaluation(err.to_string()))?
    {
        Value::Function(function) => function,
        _ => return Err(EvalError::NotAFunction),
    };

    let result = function
        .call::<_, Value>(matched)
        .map_err(|err| EvalError::Evaluation(err.to_string()))?;

    match result {
        // A coroutine is the eventual-value shape: drive it to completion
        // and take the last value it produced.
        Value::Thread(thread) => {
            let value = drive_coroutine(thread)?;
            value_to_text(value)
        }
        value => value_to_text(value),
    }
}

fn drive_coroutine(thread: Thread) -> Result<Value, EvalError> {
    let mut last = Value::Nil;
    while thread.status() == ThreadStatus::Resumable {
        last = thread
            .resume::<_, Value>(())
            .map_err(|err| EvalError::Evaluation(err.to_string()))?;
    }
    Ok(last)
}

fn value_to_text(value: Value) -> Result<String, EvalError> {
    match value {
        Value::String(s) => s
            .to_str()
            .map(|s| s.to_string())
            .map_err(|err| EvalError::Evaluation(err.to_string())),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(EvalError::InvalidReturnType(
            other.type_name().to_string(),
        )),
    }
}
