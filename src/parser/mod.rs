//! HWP/HWPX parsing module.
//!
//! Pipeline: container parts are decoded into a [`record::RecordTree`]
//! (HWP 5) or an [`xml::ElementTree`] (HWPX), the builder turns either tree
//! into the document model, and the resolver makes every style concrete.

mod builder;
mod hwp_parser;
mod options;
pub mod record;
mod resolver;
pub mod tree;
pub mod xml;

pub use hwp_parser::HwpParser;
pub use options::{ParseOptions, SectionSelection};
pub use record::{Record, RecordTree};
pub use tree::{Label, SourceTree, TreeNode};
pub use xml::{Element, ElementTree, XmlNode};
