//! Response assertions.
//!
//! [`Assertions`] evaluates named predicates against a captured response;
//! the HTML helpers back the document predicates.

mod html;
mod predicates;

pub use html::{SelectorError, absolute_links, select_text};
pub use predicates::{Assertions, RESPONSE_TIME_CEILING_SECS};
