//! Registers a handful of components from in-memory sources and loads them.
//!
//! Run with `RUST_LOG=compono_container=debug cargo run --example basic`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use compono::prelude::*;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct Config {
    message: String,
}

struct Greeter {
    config: Arc<Config>,
    ready: AtomicBool,
}

impl Greeter {
    fn greet(&self, who: &str) -> String {
        format!("{} ({who})", self.config.message)
    }
}

struct InMemory;

#[async_trait::async_trait]
impl Discover for InMemory {
    async fn discover(&self) -> std::result::Result<Vec<Source>, BoxError> {
        let config = Definition::factory(|_deps| async {
            Ok::<_, BoxError>(Config {
                message: "Hello World!".to_string(),
            })
        });

        let greeter = Definition::constructor(|deps: Dependencies| -> std::result::Result<Greeter, BoxError> {
            Ok(Greeter {
                config: deps.arg(0)?,
                ready: AtomicBool::new(false),
            })
        })
        .with_init("start", |greeter: Arc<Greeter>| async move {
            greeter.ready.store(true, Ordering::SeqCst);
            Ok::<(), BoxError>(())
        });

        let plugins = |registrar: &mut dyn Registrar| -> Result<()> {
            for name in ["plugins/audit", "plugins/metrics"] {
                registrar.register(
                    Definition::object(Object::new().with("plugin", name)),
                    ComponentOptions::new().named(name),
                )?;
            }
            Ok(())
        };

        Ok(vec![
            Source::definition("services/config.js", config).with_metadata("inject", json!({ "singleton": true })),
            Source::definition("services/greeter.js", greeter).with_metadata(
                "inject",
                json!({ "require": ["services/config"], "type": "constructor", "init": "start" }),
            ),
            Source::provider("plugins/index.js", plugins),
        ])
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let container = Container::new();
    let registered = container.discover(&InMemory).await?;
    info!(registered, names = ?container.names(), "Container ready");

    let greeter: Arc<Greeter> = container.get("services/greeter").await?;
    info!(ready = greeter.ready.load(Ordering::SeqCst), "{}", greeter.greet("demo"));

    let plugins = container.load("any!^plugins/").await?;
    for plugin in plugins.as_list().unwrap_or_default() {
        if let Some(object) = plugin.downcast::<Object>() {
            info!(plugin = ?object.value::<&str>("plugin"), "Loaded plugin");
        }
    }

    let everything = container.load(NameMap::new().entry("greeter", "services/greeter").entry("models", "all!^plugins/")).await?;
    info!(shape = ?everything, "Structured load");

    Ok(())
}
