//! # Compono: named-component container for async Rust
//!
//! Components are registered under string names together with the names
//! they depend on. The container validates the dependency graph up front
//! (cycles, missing names) and instantiates components lazily when they are
//! loaded, caching singletons.
//!
//! ```rust
//! use compono::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> compono::Result<()> {
//! let container = Container::builder()
//!     .register("middleware/a", Definition::value("a"), ComponentOptions::new())
//!     .register("middleware/b", Definition::value("b"), ComponentOptions::new())
//!     .build()?;
//!
//! let middleware = container.load("any!^middleware/").await?;
//! assert_eq!(middleware.as_list().map(|list| list.len()), Some(2));
//! # Ok(())
//! # }
//! ```

pub use compono_container::*;
pub use compono_support::*;
