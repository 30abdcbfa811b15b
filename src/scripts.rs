//! JavaScript minification
//!
//! Top-level `js/*.js` files are minified, bannered and written next to
//! their source as `name.min.js`. Already-minified files are never inputs.

use std::path::{Path, PathBuf};

use crate::banner::Banner;
use crate::context::TaskContext;
use crate::error::PipelineResult;
use crate::fileset::FileSet;
use crate::fs::{atomic_write, is_minified, min_path, read_to_string};
use crate::report::BuildReport;

/// Minify a script body
pub fn minify_js(source: &str) -> String {
    minifier::js::minify(source).to_string()
}

fn minify_file(source: &Path, banner: &Banner) -> PipelineResult<PathBuf> {
    let code = read_to_string(source)?;
    let min = min_path(source);
    atomic_write(&min, banner.wrap(&minify_js(&code)).as_bytes())?;
    Ok(min)
}

/// Minify every top-level script; any failure aborts the task
pub async fn build(ctx: &TaskContext) -> PipelineResult<BuildReport> {
    let mut report = BuildReport::default();
    let dir = ctx.scripts();
    if !dir.is_dir() {
        tracing::info!(dir = %ctx.relative(&dir).display(), "no script sources");
        return Ok(report);
    }

    let set = FileSet::new(&dir, &["*.js"]);
    let sources = tokio::task::spawn_blocking(move || set.expand()).await??;

    for source in sources.into_iter().filter(|f| !is_minified(&f.path)) {
        let banner = ctx.banner().clone();
        let path = source.path;
        let min = tokio::task::spawn_blocking(move || minify_file(&path, &banner)).await??;

        tracing::info!(file = %ctx.relative(&min).display(), "Minified");
        ctx.reload().inject_asset(ctx.relative(&min));
        report.written.push(min);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, write, SinkEvent};
    use std::fs;
    use tempfile::tempdir;

    const RESUME_JS: &str = r##"(function($) {
  "use strict"; // Start of use strict

  // Smooth scrolling using jQuery easing
  $('a.js-scroll-trigger[href*="#"]:not([href="#"])').click(function() {
    var target = $(this.hash);
    if (target.length) {
      $('html, body').animate({
        scrollTop: (target.offset().top)
      }, 1000, "easeInOutExpo");
      return false;
    }
  });

})(jQuery); // End of use strict
"##;

    #[test]
    fn minify_strips_comments_and_whitespace() {
        let min = minify_js(RESUME_JS);
        assert!(min.len() < RESUME_JS.len());
        assert!(!min.contains("Smooth scrolling"));
        assert!(min.contains("easeInOutExpo"));
    }

    #[test]
    fn minify_is_stable_in_size() {
        let once = minify_js(RESUME_JS);
        let twice = minify_js(&once);
        assert!(twice.len() <= once.len());
    }

    #[test]
    fn minify_keeps_statements_without_semicolons_apart() {
        let min = minify_js("var a = 1\nvar b = 2\n");
        assert!(min.contains("var a=1"), "{min:?}");
        assert!(min.contains("var b=2"), "{min:?}");
        assert!(!min.contains("1var"), "{min:?}");
    }

    #[test]
    fn minify_keeps_return_line_break() {
        let min = minify_js("function f() {\n  return\n  42\n}\n");
        assert!(!min.contains("return 42"), "{min:?}");
        assert!(!min.contains("return42"), "{min:?}");
        assert!(min.contains("42"), "{min:?}");
    }

    #[test]
    fn minify_keeps_regex_with_comment_opener() {
        let min = minify_js("var re = /\\/*x/g;\nvar n = 1;\n");
        assert!(min.contains("/\\/*x/g"), "{min:?}");
        assert!(min.contains("n=1"), "{min:?}");
    }

    #[test]
    fn minify_keeps_template_with_slashes() {
        let min = minify_js("var url = `see http://example.com`;\nvar n = 1;\n");
        assert!(min.contains("`see http://example.com`"), "{min:?}");
        assert!(min.contains("n=1"), "{min:?}");
    }

    #[test]
    fn minify_keeps_unary_operators_apart() {
        let min = minify_js("var c = a - -b;\nvar d = a + +b;\n");
        assert!(!min.contains("a--b"), "{min:?}");
        assert!(!min.contains("a++b"), "{min:?}");
        assert!(min.contains("-b"), "{min:?}");
        assert!(min.contains("+b"), "{min:?}");
    }

    #[tokio::test]
    async fn build_writes_min_sibling_with_banner() {
        let dir = tempdir().unwrap();
        write(dir.path(), "js/resume.js", RESUME_JS);
        let (ctx, sink) = context(dir.path());

        let report = build(&ctx).await.unwrap();

        let min = fs::read_to_string(dir.path().join("js/resume.min.js")).unwrap();
        assert!(min.starts_with(ctx.banner().as_str()));
        assert!(min.len() - ctx.banner().as_str().len() < RESUME_JS.len());
        // the source itself is untouched
        assert_eq!(
            fs::read_to_string(dir.path().join("js/resume.js")).unwrap(),
            RESUME_JS
        );
        assert_eq!(report.written, vec![dir.path().join("js/resume.min.js")]);
        assert_eq!(
            sink.events(),
            vec![SinkEvent::Inject(PathBuf::from("js/resume.min.js"))]
        );
    }

    #[tokio::test]
    async fn minified_inputs_and_subdirs_are_skipped() {
        let dir = tempdir().unwrap();
        write(dir.path(), "js/resume.min.js", "var a=1;");
        write(dir.path(), "js/lib/helper.js", "var helper = 1;");
        let (ctx, _) = context(dir.path());

        let report = build(&ctx).await.unwrap();

        assert!(report.written.is_empty());
        assert!(!dir.path().join("js/resume.min.min.js").exists());
        assert!(!dir.path().join("js/lib/helper.min.js").exists());
    }

    #[tokio::test]
    async fn rebuild_does_not_minify_its_own_output() {
        let dir = tempdir().unwrap();
        write(dir.path(), "js/resume.js", RESUME_JS);
        let (ctx, _) = context(dir.path());

        build(&ctx).await.unwrap();
        let report = build(&ctx).await.unwrap();

        assert_eq!(report.written.len(), 1);
        assert!(!dir.path().join("js/resume.min.min.js").exists());
    }

    #[tokio::test]
    async fn empty_tree_builds_nothing() {
        let dir = tempdir().unwrap();
        let (ctx, _) = context(dir.path());

        let report = build(&ctx).await.unwrap();

        assert!(report.written.is_empty());
    }
}
