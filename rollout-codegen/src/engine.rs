//! Tera synthesis engine: [`Synthesizer`].
//!
//! | Template                    | Output                                    |
//! |-----------------------------|-------------------------------------------|
//! | `entry/v1.ts.tera`          | chained v1 entry point                    |
//! | `entry/v2.ts.tera`          | direct v2 HTTP entry point                |
//! | `hooks/fetch.ts.tera`       | script reading the remote checksum cache  |
//! | `hooks/update.ts.tera`      | script writing the remote checksum cache  |

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use rollout_core::{FunctionName, FunctionSpec};

use crate::context::{EntryContext, FetchScriptContext, UpdateScriptContext};
use crate::error::SynthError;

pub(crate) const ENTRY_V1: &str = "entry/v1.ts.tera";
pub(crate) const ENTRY_V2: &str = "entry/v2.ts.tera";
const FETCH_SCRIPT: &str = "hooks/fetch.ts.tera";
const UPDATE_SCRIPT: &str = "hooks/update.ts.tera";

// Embedded templates: baked into the binary at compile time via include_str!
const TPLS: &[(&str, &str)] = &[
    (ENTRY_V1, include_str!("templates/entry_v1.ts.tera")),
    (ENTRY_V2, include_str!("templates/entry_v2.ts.tera")),
    (FETCH_SCRIPT, include_str!("templates/fetch_checksums.ts.tera")),
    (UPDATE_SCRIPT, include_str!("templates/update_checksums.ts.tera")),
];

/// Extension of generated entry points.
pub const ENTRY_EXTENSION: &str = "ts";

/// `<tmp_dir>/<function_name>.ts`: one file per function, pure, no I/O.
pub fn entry_point_path(tmp_dir: &Path, name: &FunctionName) -> PathBuf {
    tmp_dir.join(format!("{}.{ENTRY_EXTENSION}", name.0))
}

/// Tera-based synthesizer for entry points and hook scripts.
///
/// Create once with [`Synthesizer::new`] and share; rendering takes `&self`.
pub struct Synthesizer {
    tera: Tera,
}

impl Synthesizer {
    pub fn new() -> Result<Self, SynthError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(TPLS.iter().copied())?;
        Ok(Synthesizer { tera })
    }

    /// Entry-point source registering `spec`'s handler with its trigger.
    ///
    /// Fails with [`SynthError::Config`] for an invalid trigger/version
    /// combination or a missing required trigger option.
    pub fn synthesize(&self, spec: &FunctionSpec) -> Result<String, SynthError> {
        let ctx = EntryContext::from_spec(spec)?;
        self.render(ctx.template_name(), &ctx.to_tera_context()?)
    }

    /// Script that calls `fetchChecksums` from `hooks` and writes the JSON
    /// result to `output`.
    pub fn fetch_script(
        &self,
        hooks: &Path,
        project_id: &str,
        output: &Path,
    ) -> Result<String, SynthError> {
        let ctx = FetchScriptContext::new(hooks, project_id, output);
        self.render(FETCH_SCRIPT, &tera::Context::from_serialize(&ctx)?)
    }

    /// Script that passes `checksums` to `updateChecksums` from `hooks`.
    pub fn update_script(
        &self,
        hooks: &Path,
        project_id: &str,
        checksums: &BTreeMap<String, String>,
    ) -> Result<String, SynthError> {
        let ctx = UpdateScriptContext::new(hooks, project_id, checksums)?;
        self.render(UPDATE_SCRIPT, &tera::Context::from_serialize(&ctx)?)
    }

    fn render(&self, template: &str, ctx: &tera::Context) -> Result<String, SynthError> {
        let rendered = self.tera.render(template, ctx)?;
        Ok(rendered.replace("\r\n", "\n"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
