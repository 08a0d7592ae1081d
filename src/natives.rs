//! Host bindings installed into the global scope before a program runs.
//!
//! * `clock()` – seconds since the Unix epoch.
//! * `input` – an `Input` instance with `read()` and `readNum()`.
//! * `List(n)` – a growable list of `n` nil slots with `get`, `set`,
//!   `append`, `remove`, `pop` and a `length` field.
//!
//! They reach the program through the same `Callable` / instance machinery
//! as user code, so `print clock;` or `var l = List(3); l.set(0, 1);` need no
//! special casing anywhere in the evaluator.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::Utc;
use log::{debug, info};

use crate::callable::{Callable, NativeFn, NativeFunction};
use crate::class::{InstanceRef, LoxClass, LoxInstance, Method, INITIALIZER};
use crate::environment::EnvRef;
use crate::interpreter::Interpreter;
use crate::value::{is_equal, Value};

type NativeResult = std::result::Result<Value, String>;

/// Largest slot count `List(n)` will allocate up front.
const MAX_LIST_SIZE: usize = 1 << 24;

/// Define every native global in `globals`.
pub fn install(globals: &EnvRef) {
    info!("Installing native bindings");

    let mut scope = globals.borrow_mut();

    scope.define(
        "clock",
        Value::Callable(Callable::Native(Rc::new(NativeFunction::new(
            "clock", 0, clock,
        )))),
    );

    let input_class: Rc<LoxClass> = Rc::new(native_class(
        "Input",
        &[("read", 0, read as NativeFn), ("readNum", 0, read_num as NativeFn)],
    ));
    let input: InstanceRef = Rc::new(RefCell::new(LoxInstance::new(input_class)));
    scope.define("input", Value::Instance(input));

    let list_class: Rc<LoxClass> = Rc::new(native_class(
        "List",
        &[
            (INITIALIZER, 1, list_init as NativeFn),
            ("get", 1, list_get as NativeFn),
            ("set", 2, list_set as NativeFn),
            ("append", 1, list_append as NativeFn),
            ("remove", 1, list_remove as NativeFn),
            ("pop", 1, list_pop as NativeFn),
        ],
    ));
    scope.define("List", Value::Callable(Callable::Class(list_class)));
}

fn native_class(name: &str, methods: &[(&'static str, usize, NativeFn)]) -> LoxClass {
    let table: HashMap<String, Method> = methods
        .iter()
        .map(|&(method, arity, func)| {
            (
                method.to_string(),
                Method::Native(Rc::new(NativeFunction::new(method, arity, func))),
            )
        })
        .collect();

    LoxClass::new(name, None, table)
}

// ─────────────────────────────── clock ───────────────────────────────

fn clock(_: &mut Interpreter, _: Option<&InstanceRef>, _: &[Value]) -> NativeResult {
    let seconds: f64 = Utc::now().timestamp_millis() as f64 / 1000.0;

    debug!("Native function 'clock' returned: {}", seconds);

    Ok(Value::Number(seconds))
}

// ─────────────────────────────── input ───────────────────────────────

fn read(interpreter: &mut Interpreter, _: Option<&InstanceRef>, _: &[Value]) -> NativeResult {
    match interpreter.read_line() {
        Ok(Some(line)) => Ok(Value::String(line)),
        Ok(None) => Ok(Value::Nil),
        Err(e) => Err(format!("Failed to read input: {}", e)),
    }
}

fn read_num(interpreter: &mut Interpreter, _: Option<&InstanceRef>, _: &[Value]) -> NativeResult {
    let line: Option<String> = interpreter
        .read_line()
        .map_err(|e| format!("Failed to read input: {}", e))?;

    line.as_deref()
        .map(str::trim)
        .and_then(|text| text.parse::<f64>().ok())
        .map(Value::Number)
        .ok_or_else(|| "Can't convert string to number.".to_string())
}

// ─────────────────────────────── List ────────────────────────────────

fn receiver(this: Option<&InstanceRef>) -> std::result::Result<&InstanceRef, String> {
    this.ok_or_else(|| "List method called without a receiver.".to_string())
}

/// Validate `value` as an index into `len` slots.
fn index(value: &Value, len: usize) -> std::result::Result<usize, String> {
    match value {
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => {
            let i = *n as usize;
            if i < len {
                Ok(i)
            } else {
                Err("Index out of range.".to_string())
            }
        }
        _ => Err("Index must be a non-negative integer.".to_string()),
    }
}

fn sync_length(instance: &mut LoxInstance) {
    let len = instance.slots.len() as f64;
    instance.set("length", Value::Number(len));
}

fn list_init(_: &mut Interpreter, this: Option<&InstanceRef>, args: &[Value]) -> NativeResult {
    let size: usize = match &args[0] {
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => *n as usize,
        _ => return Err("List size must be a non-negative integer.".to_string()),
    };

    if size > MAX_LIST_SIZE {
        return Err("List size too large.".to_string());
    }

    let mut slots: Vec<Value> = Vec::new();
    slots
        .try_reserve_exact(size)
        .map_err(|_| "List size too large.".to_string())?;
    slots.resize(size, Value::Nil);

    let mut instance = receiver(this)?.borrow_mut();
    instance.slots = slots;
    sync_length(&mut instance);

    Ok(Value::Nil)
}

fn list_get(_: &mut Interpreter, this: Option<&InstanceRef>, args: &[Value]) -> NativeResult {
    let instance = receiver(this)?.borrow();
    let i = index(&args[0], instance.slots.len())?;

    Ok(instance.slots[i].clone())
}

fn list_set(_: &mut Interpreter, this: Option<&InstanceRef>, args: &[Value]) -> NativeResult {
    let mut instance = receiver(this)?.borrow_mut();
    let i = index(&args[0], instance.slots.len())?;
    instance.slots[i] = args[1].clone();

    Ok(args[1].clone())
}

fn list_append(_: &mut Interpreter, this: Option<&InstanceRef>, args: &[Value]) -> NativeResult {
    let mut instance = receiver(this)?.borrow_mut();
    instance.slots.push(args[0].clone());
    sync_length(&mut instance);

    Ok(Value::Nil)
}

fn list_remove(_: &mut Interpreter, this: Option<&InstanceRef>, args: &[Value]) -> NativeResult {
    let mut instance = receiver(this)?.borrow_mut();

    let position = instance
        .slots
        .iter()
        .position(|slot| is_equal(slot, &args[0]));

    match position {
        Some(i) => {
            instance.slots.remove(i);
            sync_length(&mut instance);
            Ok(Value::Bool(true))
        }
        None => Ok(Value::Bool(false)),
    }
}

fn list_pop(_: &mut Interpreter, this: Option<&InstanceRef>, args: &[Value]) -> NativeResult {
    let mut instance = receiver(this)?.borrow_mut();
    let i = index(&args[0], instance.slots.len())?;
    let value = instance.slots.remove(i);
    sync_length(&mut instance);

    Ok(value)
}
