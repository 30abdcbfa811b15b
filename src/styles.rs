//! SCSS → CSS build
//!
//! Each source is compiled with `grass` in expanded style, vendor-prefixed
//! by `lightningcss` for the configured browser query, bannered and written
//! twice: `name.css` and `name.min.css`.
//!
//! Prefixes are only added while `lightningcss` minifies the rule tree, so
//! `name.css` is the pretty-printed form of that tree, not the compiler's
//! text with prefixes spliced in. It stays one declaration per line, but
//! comments are gone, adjacent rules with equal selectors are merged and
//! colors and lengths use their shortest form.
//!
//! Compile errors in a single source are logged and that source is skipped;
//! the task itself keeps going. Read/write failures abort the task.

use std::path::{Path, PathBuf};

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use crate::banner::Banner;
use crate::context::TaskContext;
use crate::error::{PipelineError, PipelineResult};
use crate::fileset::FileSet;
use crate::fs::{atomic_write, min_path};
use crate::report::BuildReport;

/// Expanded and minified renditions of one stylesheet, without banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedCss {
    pub expanded: String,
    pub minified: String,
}

/// Resolve a browserslist query (e.g. `last 2 versions`) to prefixing targets
pub fn browser_targets(query: &str) -> PipelineResult<Targets> {
    let browsers =
        Browsers::from_browserslist([query]).map_err(|e| PipelineError::Browsers {
            query: query.to_string(),
            message: e.to_string(),
        })?;
    Ok(browsers.map(Targets::from).unwrap_or_default())
}

/// Compile one SCSS file to expanded CSS
pub fn compile_scss(path: &Path, load_paths: &[PathBuf]) -> PipelineResult<String> {
    let options = grass::Options::default()
        .style(grass::OutputStyle::Expanded)
        .load_paths(load_paths);
    grass::from_path(path, &options).map_err(|e| PipelineError::Compile {
        file: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Add vendor prefixes and produce expanded + minified output
pub fn process_css(file: &Path, css: &str, targets: Targets) -> PipelineResult<ProcessedCss> {
    let css_error = |message: String| PipelineError::Css {
        file: file.to_path_buf(),
        message,
    };

    let options = ParserOptions {
        filename: file.display().to_string(),
        ..ParserOptions::default()
    };
    let mut sheet = StyleSheet::parse(css, options).map_err(|e| css_error(e.to_string()))?;
    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| css_error(e.to_string()))?;

    let expanded = sheet
        .to_css(PrinterOptions {
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| css_error(e.to_string()))?
        .code;
    let minified = sheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| css_error(e.to_string()))?
        .code;

    Ok(ProcessedCss { expanded, minified })
}

/// Minify CSS without prefixing; used to check outputs stay stable
pub fn minify_css(css: &str) -> PipelineResult<String> {
    Ok(process_css(Path::new("<inline>"), css, Targets::default())?.minified)
}

/// Everything needed to build one stylesheet on the blocking pool
struct StyleJob {
    source: PathBuf,
    output: PathBuf,
    load_paths: Vec<PathBuf>,
    targets: Targets,
    banner: Banner,
}

impl StyleJob {
    /// Returns the minified output path
    fn run(self) -> PipelineResult<PathBuf> {
        let compiled = compile_scss(&self.source, &self.load_paths)?;
        let css = process_css(&self.source, &compiled, self.targets)?;

        atomic_write(&self.output, self.banner.wrap(&css.expanded).as_bytes())?;
        let min = min_path(&self.output);
        atomic_write(&min, self.banner.wrap(&css.minified).as_bytes())?;
        Ok(min)
    }
}

/// Compile every non-partial SCSS source
pub async fn build(ctx: &TaskContext) -> PipelineResult<BuildReport> {
    let mut report = BuildReport::default();
    let src = ctx.styles_src();
    if !src.is_dir() {
        tracing::info!(dir = %ctx.relative(&src).display(), "no stylesheet sources");
        return Ok(report);
    }

    let targets = browser_targets(&ctx.config().styles.browsers)?;
    let load_paths: Vec<PathBuf> = ctx
        .config()
        .styles
        .load_paths
        .iter()
        .map(|p| ctx.root().join(p))
        .collect();

    let set = FileSet::new(&src, &["**/*.scss"]);
    let sources = tokio::task::spawn_blocking(move || set.expand()).await??;
    let out_dir = ctx.styles_out();

    for source in sources.into_iter().filter(|f| !is_partial(&f.path)) {
        let output = out_dir.join(&source.relative).with_extension("css");
        let job = StyleJob {
            source: source.path.clone(),
            output: output.clone(),
            load_paths: load_paths.clone(),
            targets,
            banner: ctx.banner().clone(),
        };

        match tokio::task::spawn_blocking(move || job.run()).await? {
            Ok(min) => {
                tracing::info!(file = %ctx.relative(&output).display(), "Compiled");
                ctx.reload().inject_asset(ctx.relative(&min));
                report.written.push(output);
                report.written.push(min);
            }
            Err(e @ (PipelineError::Compile { .. } | PipelineError::Css { .. })) => {
                tracing::error!("{}", e);
                report.failed.push(source.path);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}

/// Sass partials (`_variables.scss`) are only ever imported
fn is_partial(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('_'))
        .unwrap_or(false)
}
