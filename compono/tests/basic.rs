//! Basic scenarios: single, multiple and structured loads over a small
//! service graph discovered from sources.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use compono::prelude::*;
use serde_json::json;
use tokio::sync::Mutex;

struct Config {
    message: String,
}

struct Bar {
    baz: String,
}

struct Foo {
    config: Arc<Config>,
    bar: Arc<Bar>,
    initialized: AtomicBool,
}

impl Foo {
    async fn initialize(&self) {
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.initialized.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct User {
    models: Mutex<Vec<String>>,
    creates: AtomicUsize,
}

impl User {
    async fn create(&self, name: &str) {
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.models.lock().await.push(name.to_string());
    }
}

struct Group {
    user_model: Arc<User>,
}

impl Group {
    async fn create(&self, users: &[&str]) {
        for user in users {
            self.user_model.create(user).await;
        }
    }
}

fn sources() -> Vec<Source> {
    let config = Definition::factory(|_deps| async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok::<_, BoxError>(Config {
            message: "Hello World!".to_string(),
        })
    });

    let bar = Definition::constructor(|_deps| {
        Ok::<_, BoxError>(Bar {
            baz: "bar".to_string(),
        })
    });

    let foo = |registrar: &mut dyn Registrar| -> Result<()> {
        let definition = Definition::constructor(|deps: Dependencies| -> std::result::Result<Foo, BoxError> {
            Ok(Foo {
                config: deps.arg(0)?,
                bar: deps.arg(1)?,
                initialized: AtomicBool::new(false),
            })
        })
        .with_init("initialize", |foo: Arc<Foo>| async move {
            foo.initialize().await;
            Ok::<(), BoxError>(())
        });

        registrar.register(
            definition,
            ComponentOptions::new()
                .singleton(true)
                .init("initialize")
                .kind(Kind::Constructor)
                .require(["services/config", "services/bar"]),
        )
    };

    let controller = |registrar: &mut dyn Registrar| -> Result<()> {
        registrar.register(
            Definition::object(Object::new()),
            ComponentOptions::new().require(NameMap::new().entry("config", "services/config").entry("foo", "services/foo")),
        )
    };

    let user = |registrar: &mut dyn Registrar| -> Result<()> {
        registrar.register(
            Definition::constructor(|_deps| Ok::<_, BoxError>(User::default())),
            ComponentOptions::new().singleton(true).kind(Kind::Constructor),
        )
    };

    let group = |registrar: &mut dyn Registrar| -> Result<()> {
        registrar.register(
            Definition::constructor(|deps: Dependencies| -> std::result::Result<Group, BoxError> {
                Ok(Group {
                    user_model: deps.field("userModel")?,
                })
            }),
            ComponentOptions::new()
                .singleton(true)
                .kind(Kind::Constructor)
                .require(NameMap::new().entry("userModel", "models/user")),
        )
    };

    vec![
        Source::definition("services/config.js", config).with_metadata("inject", json!({})),
        Source::definition("services/bar.js", bar).with_metadata("inject", json!({ "type": "constructor" })),
        Source::provider("services/foo.js", foo),
        Source::provider("controllers/a.js", controller),
        Source::provider("controllers/b.js", controller),
        Source::provider("models/user.js", user),
        Source::provider("models/group.js", group),
        Source::definition("index.js", Definition::value(())),
    ]
}

async fn container() -> Container {
    common::init_tracing();
    let container = Container::builder().namespace("inject").exclude("index.js").build().unwrap();
    let registered = container.discover(&sources()).await.unwrap();
    assert_eq!(registered, 7);
    container
}

#[tokio::test]
async fn load_string() {
    let container = container().await;

    let foo: Arc<Foo> = container.get("services/foo").await.unwrap();
    assert_eq!(foo.bar.baz, "bar");
    assert_eq!(foo.config.message, "Hello World!");
    assert!(foo.initialized.load(Ordering::SeqCst));

    let again: Arc<Foo> = container.get("services/foo").await.unwrap();
    assert!(Arc::ptr_eq(&foo, &again));
}

#[tokio::test]
async fn load_multiple() {
    let container = container().await;

    let loaded = container.load(["controllers/a", "controllers/b"]).await.unwrap();
    let [a, b] = loaded.as_list().unwrap() else {
        panic!("expected two controllers, got {loaded:?}");
    };

    let a = a.downcast::<Object>().unwrap();
    let b = b.downcast::<Object>().unwrap();

    // foo is a singleton, config is created per load
    let foo_a = a.get("foo").and_then(Resolved::as_instance).unwrap();
    let foo_b = b.get("foo").and_then(Resolved::as_instance).unwrap();
    assert!(foo_a.ptr_eq(foo_b));

    let config_a = a.get("config").and_then(Resolved::as_instance).unwrap();
    let config_b = b.get("config").and_then(Resolved::as_instance).unwrap();
    assert!(!config_a.ptr_eq(config_b));
    assert_eq!(a.value::<Config>("config").unwrap().message, "Hello World!");
}

#[tokio::test]
async fn load_object() {
    let container = container().await;

    let result = container
        .load(
            NameMap::new()
                .entry("foo", "services/foo")
                .nested("models", NameMap::new().entry("group", "models/group").entry("user", "models/user")),
        )
        .await
        .unwrap();

    let foo = result.get("foo").and_then(Resolved::downcast::<Foo>).unwrap();
    assert_eq!(foo.bar.baz, "bar");

    let models = result.get("models").unwrap();
    let group = models.get("group").and_then(Resolved::downcast::<Group>).unwrap();
    let user = models.get("user").and_then(Resolved::downcast::<User>).unwrap();
    assert!(Arc::ptr_eq(&group.user_model, &user));

    group.create(&["Bob", "Alice"]).await;
    assert_eq!(user.creates.load(Ordering::SeqCst), 2);
    assert_eq!(*user.models.lock().await, vec!["Bob", "Alice"]);
}

#[tokio::test]
async fn excluded_source_is_not_registered() {
    let container = container().await;

    assert!(!container.contains("index"));
    assert_eq!(container.len(), 7);
    assert!(matches!(
        container.load("index").await,
        Err(Error::UnknownComponent(_))
    ));
}
