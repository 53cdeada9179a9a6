use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// JSON-lines trace of extraction passes. Each event is one object with a
/// `type` field; counters accumulate across events and are drained into a
/// `debug.summary` line by [`DebugLogger::finish`].
#[derive(Clone)]
pub(crate) struct DebugLogger {
    inner: Arc<Mutex<TraceState>>,
}

struct TraceState {
    sink: BufWriter<File>,
    counters: BTreeMap<String, u64>,
}

impl DebugLogger {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let sink = BufWriter::new(File::create(path)?);
        Ok(Self {
            inner: Arc::new(Mutex::new(TraceState {
                sink,
                counters: BTreeMap::new(),
            })),
        })
    }

    /// Writes `fields` (an object) tagged with `kind`. Non-object payloads
    /// are nested under `value`.
    pub fn event(&self, kind: &str, fields: Value) {
        let mut line = Map::new();
        line.insert("type".to_string(), Value::String(kind.to_string()));
        match fields {
            Value::Object(fields) => line.extend(fields),
            Value::Null => {}
            other => {
                line.insert("value".to_string(), other);
            }
        }
        self.write_line(&Value::Object(line));
    }

    pub fn bump(&self, counter: &str) {
        if let Ok(mut state) = self.inner.lock() {
            let entry = state.counters.entry(counter.to_string()).or_insert(0);
            *entry = entry.saturating_add(1);
        }
    }

    /// Emits the summary for `context`, resets counters and flushes.
    pub fn finish(&self, context: &str) {
        let counts = match self.inner.lock() {
            Ok(mut state) => std::mem::take(&mut state.counters),
            Err(_) => return,
        };
        self.write_line(&json!({
            "type": "debug.summary",
            "context": context,
            "counts": counts,
        }));
        if let Ok(mut state) = self.inner.lock() {
            let _ = state.sink.flush();
        }
    }

    fn write_line(&self, line: &Value) {
        if let Ok(mut state) = self.inner.lock() {
            let _ = writeln!(state.sink, "{line}");
        }
    }
}
