#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use stepdag::{RunTimestamp, Step, StepClass};

/// Shared fixture backing the steps built by [`TestClassBuilder`].
///
/// Holds the state that real steps would keep in the outside world:
/// - a monotonically increasing test clock,
/// - "persisted" last-run times per class (so a freshly constructed step
///   can report when it previously ran),
/// - the ordered record of classes whose `run()` actually executed,
/// - the constructor args each class was built with.
#[derive(Clone, Default)]
pub struct TestBed {
    clock: Arc<AtomicI64>,
    times: Arc<Mutex<BTreeMap<String, RunTimestamp>>>,
    runs: Arc<Mutex<Vec<String>>>,
    args_seen: Arc<Mutex<BTreeMap<String, BTreeMap<String, Value>>>>,
}

impl TestBed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a class backed by this bed.
    pub fn class(&self, name: &str) -> TestClassBuilder {
        TestClassBuilder {
            bed: self.clone(),
            name: name.to_string(),
            dependencies: Vec::new(),
            productions: Vec::new(),
            init_args: Vec::new(),
            values: BTreeMap::new(),
            fail: false,
            delay: None,
            on_run: None,
        }
    }

    /// Pretend `class` last ran at `time`, as if persisted by an earlier run.
    pub fn set_last_run_time(&self, class: &str, time: RunTimestamp) {
        self.times
            .lock()
            .unwrap()
            .insert(class.to_string(), time);
    }

    pub fn last_run_time(&self, class: &str) -> Option<RunTimestamp> {
        self.times.lock().unwrap().get(class).copied()
    }

    /// Move the clock so that subsequent runs stamp times above `time`.
    pub fn advance_clock_to(&self, time: RunTimestamp) {
        self.clock.fetch_max(time, Ordering::SeqCst);
    }

    /// Classes whose `run()` executed, in completion order.
    pub fn executed(&self) -> Vec<String> {
        self.runs.lock().unwrap().clone()
    }

    pub fn run_count(&self, class: &str) -> usize {
        self.runs.lock().unwrap().iter().filter(|n| *n == class).count()
    }

    pub fn clear_executed(&self) {
        self.runs.lock().unwrap().clear();
    }

    /// Constructor args most recently used to build `class`.
    pub fn args_for(&self, class: &str) -> Option<BTreeMap<String, Value>> {
        self.args_seen.lock().unwrap().get(class).cloned()
    }

    fn tick(&self) -> RunTimestamp {
        self.clock.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn record_run(&self, class: &str) {
        self.runs.lock().unwrap().push(class.to_string());
    }

    fn note_args(&self, class: &str, values: &BTreeMap<String, Value>) {
        self.args_seen
            .lock()
            .unwrap()
            .insert(class.to_string(), values.clone());
    }
}

/// Builds a [`StepClass`] whose instances are [`TestStep`]s wired to a
/// [`TestBed`].
pub struct TestClassBuilder {
    bed: TestBed,
    name: String,
    dependencies: Vec<String>,
    productions: Vec<String>,
    init_args: Vec<String>,
    values: BTreeMap<String, Value>,
    fail: bool,
    delay: Option<Duration>,
    on_run: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl TestClassBuilder {
    pub fn depends_on(mut self, name: &str) -> Self {
        self.dependencies.push(name.to_string());
        self
    }

    /// Declare a production. Its value defaults to `"<class>.<name>"`.
    pub fn produces(mut self, name: &str) -> Self {
        self.productions.push(name.to_string());
        self
    }

    pub fn produces_value(mut self, name: &str, value: Value) -> Self {
        self.productions.push(name.to_string());
        self.values.insert(name.to_string(), value);
        self
    }

    pub fn init_arg(mut self, name: &str) -> Self {
        self.init_args.push(name.to_string());
        self
    }

    /// Make `run()` fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Sleep inside `run()` before doing anything else.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Hook invoked inside `run()` (e.g. a barrier to prove concurrency).
    pub fn on_run(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_run = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> StepClass {
        let mut produced: BTreeMap<String, Value> = BTreeMap::new();
        for production in &self.productions {
            let value = self
                .values
                .get(production)
                .cloned()
                .unwrap_or_else(|| json!(format!("{}.{}", self.name, production)));
            produced.insert(production.clone(), value);
        }

        let mut builder = StepClass::builder(self.name.clone());
        for dep in &self.dependencies {
            builder = builder.dependency(dep.clone());
        }
        for production in &self.productions {
            builder = builder.production(production.clone());
        }
        for arg in &self.init_args {
            builder = builder.init_arg(arg.clone());
        }

        let bed = self.bed;
        let name = self.name;
        let fail = self.fail;
        let delay = self.delay;
        let on_run = self.on_run;

        builder
            .factory(move |args| {
                bed.note_args(&name, &args.values);
                Ok(Box::new(TestStep {
                    name: name.clone(),
                    bed: bed.clone(),
                    produced: produced.clone(),
                    fail,
                    delay,
                    on_run: on_run.clone(),
                    last_run_time: bed.last_run_time(&name),
                }))
            })
            .build()
    }
}

/// A step whose behaviour is fully scripted by its builder.
pub struct TestStep {
    name: String,
    bed: TestBed,
    produced: BTreeMap<String, Value>,
    fail: bool,
    delay: Option<Duration>,
    on_run: Option<Arc<dyn Fn() + Send + Sync>>,
    last_run_time: Option<RunTimestamp>,
}

impl Step for TestStep {
    fn run(&mut self) -> anyhow::Result<()> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if let Some(hook) = &self.on_run {
            hook();
        }
        if self.fail {
            anyhow::bail!("{} was told to fail", self.name);
        }

        let time = self.bed.tick();
        self.bed.set_last_run_time(&self.name, time);
        self.bed.record_run(&self.name);
        self.last_run_time = Some(time);
        Ok(())
    }

    fn last_run_time(&self) -> Option<RunTimestamp> {
        self.last_run_time
    }

    fn productions(&self) -> BTreeMap<String, Value> {
        self.produced.clone()
    }
}
