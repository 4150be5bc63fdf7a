use std::collections::HashMap;
use std::f64::consts::{E, PI};

/// Name of the variable that always holds the most recent result
pub const ANSWER_VAR: &str = "r";

/// Called every time a variable changes, including the constant
/// re-seeding at construction and reset
pub type StoreObserver = Box<dyn FnMut()>;

/// Name to value bindings. Names are case-insensitive: they are folded
/// to lower case on every access
pub struct VarStore {
    vars: HashMap<String, f64>,
    observer: Option<StoreObserver>,
}

impl VarStore {
    pub(crate) fn new() -> Self {
        let mut store = VarStore {
            vars: HashMap::new(),
            observer: None,
        };
        store.load_constants();
        store
    }

    /// Seeds `pi`, `e`, and the answer variable `r`, firing a single
    /// change notification. Existing user variables are left alone
    pub(crate) fn load_constants(&mut self) {
        self.vars.insert("pi".to_string(), PI);
        self.vars.insert("e".to_string(), E);
        self.vars.insert(ANSWER_VAR.to_string(), 0.0);
        self.notify();
    }

    /// Creates a new binding or overwrites an existing one
    pub fn set(&mut self, name: &str, value: f64) {
        self.vars.insert(name.to_lowercase(), value);
        self.notify();
    }

    /// Looks a variable up. Unbound names read as `0.0` instead of
    /// failing: lenient lookup is the documented policy
    pub fn get(&self, name: &str) -> f64 {
        match self.vars.get(&name.to_lowercase()) {
            Some(v) => *v,
            None => 0.0,
        }
    }

    pub fn all(&self) -> &HashMap<String, f64> {
        &self.vars
    }

    pub(crate) fn set_observer(&mut self, observer: Option<StoreObserver>) {
        self.observer = observer;
    }

    fn notify(&mut self) {
        if let Some(cb) = &mut self.observer {
            cb();
        }
    }
}
