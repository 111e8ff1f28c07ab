//! Schema loader and DTS builder.
//!
//! `Loader` owns the process-wide schema memo and turns any entry document
//! (manifest, native instance, inline-XBRL set, or schema) into a resolved
//! taxonomy set. Loading one schema runs two concurrent fan-outs: one over
//! its `linkbaseRef`s and one over its imports, each joined to completion
//! before the schema is returned. Failures on secondary documents
//! (linkbases, imported schemas) are logged and omitted from the graph;
//! failures on the primary chain propagate to the caller.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::future::{BoxFuture, join_all};
use tracing::{debug, warn};

use crate::decode;
use crate::error::{Result, XbrlError};
use crate::fetcher::{FetcherConfig, ResourceFetcher};
use crate::href::resolve_href;
use crate::inline;
use crate::model::*;

/// Import targets under the XBRL standard namespace are never fetched; their
/// import edges stay unresolved.
pub fn is_standard_xbrl_schema(href: &str) -> bool {
    href.starts_with("http://www.xbrl.org/")
}

/// Linkbase kind selected by the `role` attribute of a `linkbaseRef`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkbaseKind {
    Label,
    Reference,
    Presentation,
    Definition,
    Calculation,
    Generic,
}

impl LinkbaseKind {
    /// Substring match on the role; an empty role selects the generic kind,
    /// and unrecognized roles select nothing.
    fn classify(role: &str) -> Option<Self> {
        if role.contains("labelLinkbaseRef") {
            Some(Self::Label)
        } else if role.contains("referenceLinkbaseRef") {
            Some(Self::Reference)
        } else if role.contains("presentationLinkbaseRef") {
            Some(Self::Presentation)
        } else if role.contains("definitionLinkbaseRef") {
            Some(Self::Definition)
        } else if role.contains("calculationLinkbaseRef") {
            Some(Self::Calculation)
        } else if role.is_empty() {
            Some(Self::Generic)
        } else {
            None
        }
    }
}

enum DecodedLinkbase {
    Label(LabelLinkbase),
    Reference(ReferenceLinkbase),
    Presentation(PresentationLinkbase),
    Definition(DefinitionLinkbase),
    Calculation(CalculationLinkbase),
    Generic(GenericLinkbase),
}

// ---------------------------------------------------------------------------
// Schema store
// ---------------------------------------------------------------------------

/// Process-wide memo of interned schemas, keyed by canonical path.
///
/// Concurrent loads of the same path either observe the already-interned
/// schema or race to install; the first writer wins and later builders adopt
/// its id, so consumers never see a double construction.
#[derive(Default)]
pub struct SchemaStore {
    inner: RwLock<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    schemas: Vec<Arc<Schema>>,
    by_path: HashMap<String, SchemaId>,
}

impl SchemaStore {
    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Id of the schema interned under `path`, if any.
    pub fn lookup(&self, path: &str) -> Option<SchemaId> {
        self.read().by_path.get(path).copied()
    }

    /// Shared handle to an interned schema.
    pub fn get(&self, id: SchemaId) -> Option<Arc<Schema>> {
        self.read().schemas.get(id.index()).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Intern a schema. Returns its id and whether this call installed it;
    /// on a lost race the already-interned id is returned instead.
    fn install(&self, mut schema: Schema) -> (SchemaId, bool) {
        let mut inner = self.write();
        if let Some(&id) = inner.by_path.get(&schema.path) {
            return (id, false);
        }

        let id = SchemaId(inner.schemas.len() as u32);
        for element in &mut schema.elements {
            element.schema = id;
        }
        for role_type in &mut schema.role_types {
            role_type.schema = id;
        }

        inner.by_path.insert(schema.path.clone(), id);
        inner.schemas.push(Arc::new(schema));
        (id, true)
    }

    /// Immutable view of every schema interned so far. Ids remain valid
    /// across snapshots.
    pub fn snapshot(&self) -> DtsSnapshot {
        let inner = self.read();
        DtsSnapshot {
            schemas: inner.schemas.clone(),
            by_path: inner.by_path.clone(),
        }
    }
}

/// Point-in-time view of the store that traversals and indexers borrow from.
pub struct DtsSnapshot {
    schemas: Vec<Arc<Schema>>,
    by_path: HashMap<String, SchemaId>,
}

impl DtsSnapshot {
    pub fn schema(&self, id: SchemaId) -> Option<&Schema> {
        self.schemas.get(id.index()).map(Arc::as_ref)
    }

    pub fn lookup(&self, path: &str) -> Option<SchemaId> {
        self.by_path.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SchemaId, &Schema)> {
        self.schemas
            .iter()
            .enumerate()
            .map(|(i, s)| (SchemaId(i as u32), s.as_ref()))
    }
}

// ---------------------------------------------------------------------------
// Entry dispatch
// ---------------------------------------------------------------------------

/// A loaded entry document, selected by the entry file's root element.
pub enum EntryDocument {
    Manifest(Manifest),
    Instance(Instance),
    Schema(SchemaId),
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// DTS loader: fetches, decodes, and interns schemas with their linkbases.
pub struct Loader {
    fetcher: ResourceFetcher,
    store: SchemaStore,
}

impl Loader {
    pub fn new(config: FetcherConfig) -> Result<Self> {
        Ok(Self {
            fetcher: ResourceFetcher::new(config)?,
            store: SchemaStore::default(),
        })
    }

    pub fn store(&self) -> &SchemaStore {
        &self.store
    }

    pub fn snapshot(&self) -> DtsSnapshot {
        self.store.snapshot()
    }

    /// Dispatch on the entry file's root element: `manifest`, `xbrl`, or
    /// `schema`. Anything else is an error.
    pub async fn load_entry(&self, path: &str) -> Result<EntryDocument> {
        let bytes = self.fetcher.open(path).await?;
        let text = decode::document_text(bytes, path)?;
        let root = decode::peek_root_local_name(&text, path)?;

        match root.as_str() {
            "manifest" => Ok(EntryDocument::Manifest(self.load_manifest(path).await?)),
            "xbrl" => Ok(EntryDocument::Instance(self.load_instance(path).await?)),
            "schema" => Ok(EntryDocument::Schema(self.load_schema(path).await?)),
            _ => Err(XbrlError::UnknownEntryRoot { root }),
        }
    }

    /// Load a schema and everything it transitively references. Memoized by
    /// canonical path across the life of the loader.
    pub async fn load_schema(&self, path: &str) -> Result<SchemaId> {
        self.load_schema_visited(path.to_string(), HashSet::new())
            .await
    }

    fn load_schema_visited(
        &self,
        path: String,
        mut visited: HashSet<String>,
    ) -> BoxFuture<'_, Result<SchemaId>> {
        Box::pin(async move {
            if let Some(id) = self.store.lookup(&path) {
                return Ok(id);
            }
            if !visited.insert(path.clone()) {
                return Err(XbrlError::CyclicImport { path });
            }

            let bytes = self.fetcher.open(&path).await?;
            let text = decode::document_text(bytes, &path)?;
            let mut schema = {
                let doc = decode::parse_document(&text, &path)?;
                decode::decode_schema(&doc, &path)
            };

            self.load_linkbases(&mut schema).await;

            // Intern before resolving imports so cyclic DTSes terminate on
            // the memo instead of recursing.
            let (id, installed) = self.store.install(schema);
            if !installed {
                debug!(path = %path, "schema already interned by a concurrent load");
                return Ok(id);
            }

            let Some(shared) = self.store.get(id) else {
                return Ok(id);
            };
            let imports = shared.imports.iter().map(|import| {
                // Each descent gets its own copy of the visit set so sibling
                // branches track cycles independently.
                let visited = visited.clone();
                let base = path.clone();
                async move {
                    let target = resolve_href(&base, &import.schema_location);
                    if is_standard_xbrl_schema(&target) {
                        let _ = import.resolved.set(None);
                        return;
                    }
                    match self.load_schema_visited(target.clone(), visited).await {
                        Ok(child) => {
                            let _ = import.resolved.set(Some(child));
                        }
                        Err(e) => {
                            warn!(schema = %target, error = %e, "failed to load imported schema");
                            let _ = import.resolved.set(None);
                        }
                    }
                }
            });
            join_all(imports).await;

            Ok(id)
        })
    }

    /// Concurrent fan-out over the schema's `linkbaseRef`s. Failures are
    /// logged and the linkbase omitted; the schema load itself never fails
    /// here.
    async fn load_linkbases(&self, schema: &mut Schema) {
        let base = schema.path.clone();
        let fetches = schema.linkbase_refs.iter().map(|linkbase_ref| {
            let base = base.clone();
            async move {
                let kind = LinkbaseKind::classify(&linkbase_ref.role)?;
                let href = resolve_href(&base, &linkbase_ref.href);
                match self.fetch_linkbase(kind, &href).await {
                    Ok(decoded) => Some(decoded),
                    Err(e) => {
                        warn!(linkbase = %href, error = %e, "failed to load linkbase");
                        None
                    }
                }
            }
        });

        let decoded_linkbases = join_all(fetches).await;
        for decoded in decoded_linkbases.into_iter().flatten() {
            match decoded {
                DecodedLinkbase::Label(lb) => schema.label_linkbases.push(lb),
                DecodedLinkbase::Reference(lb) => schema.reference_linkbases.push(lb),
                DecodedLinkbase::Presentation(lb) => schema.presentation_linkbases.push(lb),
                DecodedLinkbase::Definition(lb) => schema.definition_linkbases.push(lb),
                DecodedLinkbase::Calculation(lb) => schema.calculation_linkbases.push(lb),
                DecodedLinkbase::Generic(lb) => schema.generic_linkbases.push(lb),
            }
        }
    }

    async fn fetch_linkbase(&self, kind: LinkbaseKind, href: &str) -> Result<DecodedLinkbase> {
        let bytes = self.fetcher.open(href).await?;
        let text = decode::document_text(bytes, href)?;
        let doc = decode::parse_document(&text, href)?;

        Ok(match kind {
            LinkbaseKind::Label => {
                DecodedLinkbase::Label(decode::decode_label_linkbase(&doc, href)?)
            }
            LinkbaseKind::Reference => {
                DecodedLinkbase::Reference(decode::decode_reference_linkbase(&doc, href)?)
            }
            LinkbaseKind::Presentation => {
                DecodedLinkbase::Presentation(decode::decode_presentation_linkbase(&doc, href)?)
            }
            LinkbaseKind::Definition => {
                DecodedLinkbase::Definition(decode::decode_definition_linkbase(&doc, href)?)
            }
            LinkbaseKind::Calculation => {
                DecodedLinkbase::Calculation(decode::decode_calculation_linkbase(&doc, href)?)
            }
            LinkbaseKind::Generic => {
                DecodedLinkbase::Generic(decode::decode_generic_linkbase(&doc, href)?)
            }
        })
    }

    /// Load a native XBRL instance and the DTS behind its `schemaRef`.
    pub async fn load_instance(&self, path: &str) -> Result<Instance> {
        let bytes = self.fetcher.open(path).await?;
        let text = decode::document_text(bytes, path)?;
        let mut instance = {
            let doc = decode::parse_document(&text, path)?;
            decode::decode_instance(&doc, path)
        };

        self.attach_schema(&mut instance).await?;
        Ok(instance)
    }

    /// Assemble one instance from a set of inline-XBRL documents, then load
    /// the DTS behind the recorded `schemaRef`.
    pub async fn load_inline_xbrl(&self, files: &[String], instance_path: &str) -> Result<Instance> {
        let mut instance = Instance::new(instance_path);

        for file in files {
            let bytes = self.fetcher.open(file).await?;
            let text = decode::document_text(bytes, file)?;
            inline::extract_into(&text, file, &mut instance)?;
        }

        self.attach_schema(&mut instance).await?;
        Ok(instance)
    }

    /// Load a manifest and resolve every instance descriptor it lists.
    /// Descriptors with inline files go through extraction; others load as
    /// native instances.
    pub async fn load_manifest(&self, path: &str) -> Result<Manifest> {
        let bytes = self.fetcher.open(path).await?;
        let text = decode::document_text(bytes, path)?;
        let mut manifest = {
            let doc = decode::parse_document(&text, path)?;
            decode::decode_manifest(&doc, path)
        };

        if manifest.list.descriptors.is_empty() {
            return Err(XbrlError::EmptyManifest {
                path: path.to_string(),
            });
        }

        let descriptors = manifest.list.descriptors.clone();
        for descriptor in &descriptors {
            let instance_path = resolve_href(path, &descriptor.preferred_filename);
            let instance = if descriptor.ixbrl_files.is_empty() {
                self.load_instance(&instance_path).await?
            } else {
                let files: Vec<String> = descriptor
                    .ixbrl_files
                    .iter()
                    .map(|f| resolve_href(path, f))
                    .collect();
                self.load_inline_xbrl(&files, &instance_path).await?
            };
            manifest.list.instances.push(instance);
        }

        Ok(manifest)
    }

    async fn attach_schema(&self, instance: &mut Instance) -> Result<()> {
        if instance.schema_ref.href.is_empty() {
            return Err(XbrlError::MissingSchemaRef {
                path: instance.path.clone(),
            });
        }

        let schema_path = resolve_href(&instance.path, &instance.schema_ref.href);
        let id = self.load_schema(&schema_path).await?;
        instance.schema_ref.schema = Some(id);
        Ok(())
    }
}
