//! # xbrl-dts
//!
//! Loads an XBRL financial-report package, resolves its Discoverable
//! Taxonomy Set, and exposes a typed in-memory graph for downstream
//! queries: label and reference lookup, presentation and definition
//! trees, generic role labels, and fact extraction.
//!
//! Entry points:
//!
//! - [`Loader::load_entry`] dispatches on the entry document's root element
//!   (manifest, instance, or schema).
//! - [`Loader::load_inline_xbrl`] assembles one instance from a set of
//!   inline-XBRL (XHTML) documents, applying the Japanese-locale value
//!   transforms.
//! - The `traverse` module turns the loaded graph into role-grouped,
//!   typed arc relations; `index` provides the href lookup maps behind it.
//!
//! Schemas are fetched concurrently, memoized by canonical path for the
//! life of the [`Loader`], and shared across import branches; cyclic
//! imports resolve against the memo instead of recursing.

pub mod cli;
pub mod decode;
pub mod error;
pub mod fetcher;
pub mod href;
pub mod index;
pub mod inline;
pub mod loader;
pub mod model;
pub mod transform;
pub mod traverse;

pub use error::{Result, TransformError, XbrlError};
pub use fetcher::{
    DEFAULT_TAXONOMY_DIR, EDINET_TAXONOMY_PREFIX, FetcherConfig, ResourceFetcher,
};
pub use href::{is_remote, resolve_href};
pub use index::{collect_elements, collect_role_types};
pub use inline::extract_into;
pub use loader::{DtsSnapshot, EntryDocument, Loader, SchemaStore, is_standard_xbrl_schema};
pub use model::{
    Context, ElementDecl, Fact, Instance, Manifest, QName, RoleType, Schema, SchemaId, Unit,
};
pub use transform::{cjk_date_to_iso, shift_decimal, to_halfwidth_digits, wareki_to_iso};
pub use traverse::{
    ArcRelation, DefinitionRelation, Endpoint, GenericRelation, LabelRelation,
    PresentationRelation, RefKey, ReferenceRelation, build_adjacency, find_roots,
    traverse_definition_links, traverse_generic_links, traverse_label_links,
    traverse_presentation_links, traverse_reference_links,
};
