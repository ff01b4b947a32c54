//! dyncoll: dynamically-typed collections for a scripting host
//!
//! Key design principles:
//! - Value: the dynamic datum (numbers, strings, dates, arrays, collections)
//! - One total order over every value, used for lookup, dedup, equality and sort
//! - Sequence, KeyedMap, OrderedSet: shared handles over interior-mutable storage
//! - Enumerations guard their collection; `Sequence::each` edits through a Modifier
//!
//! Everything is single-threaded: handles are `Rc`-based and not `Send`.

pub mod collection;
pub mod error;
pub mod format;
pub mod guard;
pub mod map;
pub mod modifier;
pub mod order;
pub mod sequence;
pub mod set;
mod store;
pub mod value;

pub use collection::Collection;
pub use error::{CollectionError, Result};
pub use guard::{IterationGuard, IterationScope};
pub use map::{Entry, KeyedMap};
pub use modifier::Modifier;
pub use order::{TypeRank, compare, equivalent, sort_values};
pub use sequence::Sequence;
pub use set::OrderedSet;
pub use value::{PropertyBag, Value};

// Stringification hook
pub use format::{FormatConfig, property_key, to_json_string};
