//! Template contexts: serializable rendering payloads.
//!
//! Every string that lands in generated source is quoted here, so templates
//! interpolate values verbatim.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use rollout_core::FunctionSpec;

use crate::chain::{binding, Binding};
use crate::error::SynthError;
use crate::literal::quote;

/// Payload for the entry-point templates.
#[derive(Debug, Clone, Serialize)]
pub struct EntryContext {
    /// Exported symbol; the function name verbatim.
    pub function_name: String,
    /// Quoted module specifier of the user's handler.
    pub source_path: String,
    #[serde(flatten)]
    pub binding: BindingCtx,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BindingCtx {
    Chained { expression: String },
    Direct { factory: String, options: String },
}

impl EntryContext {
    /// Resolve the binding for `spec`; fails on configuration errors.
    pub fn from_spec(spec: &FunctionSpec) -> Result<Self, SynthError> {
        let binding = match binding(spec)? {
            Binding::Chained { expression } => BindingCtx::Chained { expression },
            Binding::Direct { factory, options } => BindingCtx::Direct {
                factory: factory.to_string(),
                options,
            },
        };
        Ok(Self {
            function_name: spec.function_name.0.clone(),
            source_path: module_specifier(&spec.source_path),
            binding,
        })
    }

    /// Embedded template this context renders with.
    pub fn template_name(&self) -> &'static str {
        match self.binding {
            BindingCtx::Chained { .. } => crate::engine::ENTRY_V1,
            BindingCtx::Direct { .. } => crate::engine::ENTRY_V2,
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, SynthError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}

/// Payload for the remote-cache fetch script.
#[derive(Debug, Clone, Serialize)]
pub struct FetchScriptContext {
    pub hooks_path: String,
    pub project_id: String,
    pub output_path: String,
}

impl FetchScriptContext {
    pub fn new(hooks: &Path, project_id: &str, output: &Path) -> Self {
        Self {
            hooks_path: module_specifier(hooks),
            project_id: quote(project_id),
            output_path: module_specifier(output),
        }
    }
}

/// Payload for the remote-cache update script.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateScriptContext {
    pub hooks_path: String,
    pub project_id: String,
    /// JSON object `functionName → checksum`.
    pub checksums: String,
}

impl UpdateScriptContext {
    pub fn new(
        hooks: &Path,
        project_id: &str,
        checksums: &BTreeMap<String, String>,
    ) -> Result<Self, SynthError> {
        Ok(Self {
            hooks_path: module_specifier(hooks),
            project_id: quote(project_id),
            checksums: serde_json::to_string(checksums)?,
        })
    }
}

/// Quoted, forward-slashed path usable as an import specifier.
fn module_specifier(path: &Path) -> String {
    quote(&path.to_string_lossy().replace('\\', "/"))
}
