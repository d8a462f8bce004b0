//! Internationalization with JSON dictionaries.
//!
//! A [`Dictionary`] maps each locale to a tree of messages. Messages are looked
//! up by dot-notated paths like `home.title` or `menu.items[0]`, and `{{ name }}`
//! placeholders in them are filled in from the parameters passed to a [`Translator`].
//!
//! ```rust
//! use lingo_core::{i18n::{Dictionary, Translator}, json};
//! use std::sync::Arc;
//!
//! let mut dictionary = Dictionary::new();
//! dictionary.insert("en", json!({ "hello": "Hello, {{name}}!" }));
//! dictionary.insert("es", json!({ "hello": "Hola {{name}}!" }));
//!
//! let translator = Translator::new(Arc::new(dictionary), "en");
//! let params = json!({ "name": "world" });
//! assert_eq!(translator.translate("hello", Some(&params)), "Hello, world!");
//! assert_eq!(translator.translate_in("hello", Some(&params), "es"), "Hola world!");
//! ```

mod dictionary;
mod path;
mod template;
mod translator;

pub use dictionary::Dictionary;
pub use path::{PathSegment, lookup_path, lookup_segments};
pub use template::render_template;
pub use translator::Translator;
