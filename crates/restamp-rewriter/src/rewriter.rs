//! The rewrite pass.
//!
//! For every configured [`TargetSpec`], each matching asset is read as UTF-8
//! text and passed through its rules in order. A rule resolves the related
//! asset name (assets produced by this pass win over assets carried over from
//! a previous one) and substitutes it for every placeholder match.
//!
//! Failure policy:
//!
//! - non-raw or non-UTF-8 targets are reported and skipped
//! - a rule whose source pattern matches no asset stops the whole pass

use std::collections::HashSet;

use regex::{Captures, Regex};
use restamp_assets::{AfterCompile, AssetSet, AssetSource, Compilation};

use crate::error::RewriteError;
use crate::matcher::basename;
use crate::target::{Rule, TargetSpec};

/// Summary of a single rewrite pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RewriteReport {
    /// Target assets whose content was written back, in processing order.
    pub rewritten: Vec<String>,
    /// Total number of placeholder matches replaced.
    pub replacements: usize,
    /// True if an unresolved rule stopped the pass early.
    pub aborted: bool,
}

/// Asset names partitioned for lookup, in asset set order.
struct Names<'a> {
    /// Names not yet emitted by a previous pass.
    fresh: Vec<&'a str>,
    /// Every name.
    all: &'a [String],
}

impl<'a> Names<'a> {
    /// First fresh name matching `pattern`, falling back to any name.
    fn resolve(&self, pattern: &Regex) -> Option<&'a str> {
        self.fresh
            .iter()
            .copied()
            .find(|name| pattern.is_match(name))
            .or_else(|| {
                self.all
                    .iter()
                    .map(String::as_str)
                    .find(|name| pattern.is_match(name))
            })
    }
}

/// Rewrites placeholders in target assets with the names of related assets.
///
/// The target list is fixed at construction. The rewriter keeps no state
/// between passes, so one instance can serve every build of a watch session.
#[derive(Debug, Clone)]
pub struct Rewriter {
    targets: Vec<TargetSpec>,
}

impl Rewriter {
    /// Hook name used when recording compilation errors.
    pub const NAME: &'static str = "restamp";

    /// Create a rewriter for the given targets, applied in order.
    #[must_use]
    pub fn new(targets: Vec<TargetSpec>) -> Self {
        Self { targets }
    }

    /// Configured targets.
    #[must_use]
    pub fn targets(&self) -> &[TargetSpec] {
        &self.targets
    }

    /// Run the pass over a compilation, appending errors to its error log.
    pub fn process(&self, compilation: &mut Compilation) -> RewriteReport {
        let (report, errors) = self.rewrite(&mut compilation.assets);
        for error in errors {
            compilation.push_error(Self::NAME, error);
        }
        report
    }

    /// Run the pass over an asset set and return the errors directly.
    pub fn rewrite(&self, assets: &mut AssetSet) -> (RewriteReport, Vec<RewriteError>) {
        let all: Vec<String> = assets.names().map(str::to_owned).collect();
        let names = Names {
            fresh: all
                .iter()
                .map(String::as_str)
                .filter(|name| assets.get(name).is_some_and(|asset| !asset.emitted))
                .collect(),
            all: &all,
        };

        let mut report = RewriteReport::default();
        let mut errors = Vec::new();
        // Names skipped as unreadable are not retried by later targets.
        let mut rejected: HashSet<&str> = HashSet::new();

        for target in &self.targets {
            for name in names.all.iter().filter(|name| target.matcher.matches(name)) {
                if rejected.contains(name.as_str()) {
                    continue;
                }
                match Self::rewrite_asset(target, name, assets, &names) {
                    Ok(Some(count)) => {
                        report.rewritten.push(name.clone());
                        report.replacements += count;
                    }
                    Ok(None) => {}
                    Err(error) if error.is_fatal() => {
                        tracing::warn!(asset = %name, error = %error, "Rewrite pass aborted");
                        errors.push(error);
                        report.aborted = true;
                        return (report, errors);
                    }
                    Err(error) => {
                        tracing::warn!(asset = %name, error = %error, "Skipping asset");
                        rejected.insert(name);
                        errors.push(error);
                    }
                }
            }
        }

        (report, errors)
    }

    /// Rewrite one target asset.
    ///
    /// Returns the number of replacements made, or `None` if the asset vanished.
    /// The asset is written back only after every rule resolved.
    fn rewrite_asset(
        target: &TargetSpec,
        name: &str,
        assets: &mut AssetSet,
        names: &Names<'_>,
    ) -> Result<Option<usize>, RewriteError> {
        let Some(asset) = assets.get(name) else {
            return Ok(None);
        };
        let Some(bytes) = asset.source.as_raw() else {
            return Err(RewriteError::UnsupportedSource {
                asset: name.to_owned(),
                kind: asset.source.kind(),
            });
        };
        let mut content = std::str::from_utf8(bytes)
            .map_err(|_| RewriteError::InvalidUtf8 {
                asset: name.to_owned(),
            })?
            .to_owned();

        let mut total = 0;
        for rule in &target.rules {
            let related = names
                .resolve(&rule.source)
                .ok_or_else(|| RewriteError::UnresolvedSource {
                    asset: name.to_owned(),
                    pattern: rule.source.as_str().to_owned(),
                })?;
            let resolved = if target.basename_only {
                basename(related)
            } else {
                related
            };
            let (replaced, count) = substitute(name, &content, rule, resolved);
            content = replaced;
            total += count;
        }

        assets.replace_source(name, AssetSource::Raw(content.into_bytes()));
        Ok(Some(total))
    }
}

/// Replace every placeholder match in `content` with `resolved`, verbatim.
fn substitute(asset: &str, content: &str, rule: &Rule, resolved: &str) -> (String, usize) {
    let mut count = 0;
    let replaced = rule
        .placeholder
        .replace_all(content, |caps: &Captures<'_>| {
            count += 1;
            tracing::info!(asset, matched = &caps[0], resolved, "Replaced placeholder");
            resolved.to_owned()
        })
        .into_owned();
    (replaced, count)
}

impl AfterCompile for Rewriter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn after_compile(&self, compilation: &mut Compilation) {
        let report = self.process(compilation);
        tracing::debug!(
            rewritten = report.rewritten.len(),
            replacements = report.replacements,
            aborted = report.aborted,
            "Rewrite pass finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use restamp_assets::{Asset, SourceKind};

    use super::*;

    fn rule(source: &str, placeholder: &str) -> Rule {
        Rule::parse(source, placeholder).unwrap()
    }

    fn text(assets: &AssetSet, name: &str) -> String {
        let bytes = assets.get(name).unwrap().source.as_raw().unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn js_rewriter() -> Rewriter {
        Rewriter::new(vec![
            TargetSpec::exact("index.html").rule(rule(r"main.*\.js", r"\{\{JS\}\}")),
        ])
    }

    #[test]
    fn test_replaces_placeholder_with_new_asset_name() {
        let mut assets: AssetSet = [
            ("index.html", Asset::raw("<script src='{{JS}}'>")),
            ("main-e4f1.js", Asset::raw("console.log(1)")),
        ]
        .into_iter()
        .collect();

        let (report, errors) = js_rewriter().rewrite(&mut assets);

        assert!(errors.is_empty());
        assert_eq!(text(&assets, "index.html"), "<script src='main-e4f1.js'>");
        assert_eq!(
            report,
            RewriteReport {
                rewritten: vec!["index.html".to_owned()],
                replacements: 1,
                aborted: false,
            }
        );
    }

    #[test]
    fn test_new_asset_wins_over_emitted_asset() {
        let mut assets: AssetSet = [
            ("index.html", Asset::raw("<script src='{{JS}}'>")),
            ("main-e4f1.js", Asset::raw("old").emitted()),
            ("main-9a0b.js", Asset::raw("new")),
        ]
        .into_iter()
        .collect();

        let (_, errors) = js_rewriter().rewrite(&mut assets);

        assert!(errors.is_empty());
        assert_eq!(text(&assets, "index.html"), "<script src='main-9a0b.js'>");
    }

    #[test]
    fn test_falls_back_to_emitted_asset() {
        let mut assets: AssetSet = [
            ("index.html", Asset::raw("{{JS}}")),
            ("main-e4f1.js", Asset::raw("old").emitted()),
        ]
        .into_iter()
        .collect();

        let (_, errors) = js_rewriter().rewrite(&mut assets);

        assert!(errors.is_empty());
        assert_eq!(text(&assets, "index.html"), "main-e4f1.js");
    }

    #[test]
    fn test_first_fresh_match_in_insertion_order_wins() {
        let mut assets: AssetSet = [
            ("index.html", Asset::raw("{{JS}}")),
            ("main-bbbb.js", Asset::raw("b")),
            ("main-aaaa.js", Asset::raw("a")),
        ]
        .into_iter()
        .collect();

        js_rewriter().rewrite(&mut assets);

        assert_eq!(text(&assets, "index.html"), "main-bbbb.js");
    }

    #[test]
    fn test_replaces_every_occurrence() {
        let mut assets: AssetSet = [
            ("index.html", Asset::raw("<link href='{{JS}}'><script src='{{JS}}'>")),
            ("main-1.js", Asset::raw("")),
        ]
        .into_iter()
        .collect();

        let (report, _) = js_rewriter().rewrite(&mut assets);

        assert_eq!(
            text(&assets, "index.html"),
            "<link href='main-1.js'><script src='main-1.js'>"
        );
        assert_eq!(report.replacements, 2);
    }

    #[test]
    fn test_basename_only_strips_directories() {
        let rewriter = Rewriter::new(vec![
            TargetSpec::exact("index.html")
                .basename_only(true)
                .rule(rule(r"main.*\.js", r"\{\{JS\}\}")),
        ]);
        let mut assets: AssetSet = [
            ("index.html", Asset::raw("src={{JS}}")),
            ("dist/js/main-abc123.js", Asset::raw("")),
        ]
        .into_iter()
        .collect();

        rewriter.rewrite(&mut assets);

        assert_eq!(text(&assets, "index.html"), "src=main-abc123.js");
    }

    #[test]
    fn test_rules_apply_in_order_on_rewritten_content() {
        // The first rule introduces text the second rule matches.
        let rewriter = Rewriter::new(vec![
            TargetSpec::exact("index.html")
                .rule(rule(r"main.*\.js", r"\{\{JS\}\}"))
                .rule(rule(r"^vendor", r"main-\w+\.js")),
        ]);
        let mut assets: AssetSet = [
            ("index.html", Asset::raw("{{JS}}")),
            ("main-abc.js", Asset::raw("")),
            ("vendor-def.js", Asset::raw("")),
        ]
        .into_iter()
        .collect();

        rewriter.rewrite(&mut assets);

        assert_eq!(text(&assets, "index.html"), "vendor-def.js");
    }

    #[test]
    fn test_unmatched_assets_are_untouched() {
        let mut assets: AssetSet = [
            ("index.html", Asset::raw("{{JS}}")),
            ("about.html", Asset::raw("{{JS}}")),
            ("main-1.js", Asset::raw("{{JS}}")),
        ]
        .into_iter()
        .collect();
        let before = assets.clone();

        js_rewriter().rewrite(&mut assets);

        assert_eq!(assets.get("about.html"), before.get("about.html"));
        assert_eq!(assets.get("main-1.js"), before.get("main-1.js"));
    }

    #[test]
    fn test_pattern_target_rewrites_every_match() {
        let rewriter = Rewriter::new(vec![
            TargetSpec::pattern(Regex::new(r"\.html$").unwrap())
                .rule(rule(r"\.css$", r"\{\{CSS\}\}")),
        ]);
        let mut assets: AssetSet = [
            ("index.html", Asset::raw("{{CSS}}")),
            ("about.html", Asset::raw("<{{CSS}}>")),
            ("style-77.css", Asset::raw("")),
        ]
        .into_iter()
        .collect();

        let (report, _) = rewriter.rewrite(&mut assets);

        assert_eq!(text(&assets, "index.html"), "style-77.css");
        assert_eq!(text(&assets, "about.html"), "<style-77.css>");
        assert_eq!(report.rewritten, vec!["index.html", "about.html"]);
    }

    #[test]
    fn test_dollar_in_name_is_inserted_literally() {
        let mut assets: AssetSet = [
            ("index.html", Asset::raw("{{JS}}")),
            ("main$1.js", Asset::raw("")),
        ]
        .into_iter()
        .collect();

        js_rewriter().rewrite(&mut assets);

        assert_eq!(text(&assets, "index.html"), "main$1.js");
    }

    #[test]
    fn test_unresolved_source_records_error_and_leaves_target() {
        let mut compilation = Compilation::new();
        compilation
            .assets
            .insert("index.html", Asset::raw("<script src='{{JS}}'>"));
        compilation.assets.insert("style.css", Asset::raw(""));

        let report = js_rewriter().process(&mut compilation);

        assert!(report.aborted);
        assert!(report.rewritten.is_empty());
        assert_eq!(compilation.errors.len(), 1);
        assert_eq!(compilation.errors[0].hook, "restamp");
        assert!(compilation.errors[0].message.contains(r"main.*\.js"));
        assert_eq!(
            text(&compilation.assets, "index.html"),
            "<script src='{{JS}}'>"
        );
    }

    #[test]
    fn test_unresolved_source_stops_later_targets() {
        let rewriter = Rewriter::new(vec![
            TargetSpec::exact("a.html").rule(rule(r"main.*\.js", r"\{\{JS\}\}")),
            TargetSpec::exact("b.html").rule(rule(r"missing", r"\{\{JS\}\}")),
            TargetSpec::exact("c.html").rule(rule(r"main.*\.js", r"\{\{JS\}\}")),
        ]);
        let mut assets: AssetSet = [
            ("a.html", Asset::raw("{{JS}}")),
            ("b.html", Asset::raw("{{JS}}")),
            ("c.html", Asset::raw("{{JS}}")),
            ("main-1.js", Asset::raw("")),
        ]
        .into_iter()
        .collect();

        let (report, errors) = rewriter.rewrite(&mut assets);

        assert_eq!(text(&assets, "a.html"), "main-1.js");
        assert_eq!(text(&assets, "b.html"), "{{JS}}");
        assert_eq!(text(&assets, "c.html"), "{{JS}}");
        assert_eq!(
            errors,
            vec![RewriteError::UnresolvedSource {
                asset: "b.html".to_owned(),
                pattern: "missing".to_owned(),
            }]
        );
        assert!(report.aborted);
    }

    #[test]
    fn test_unresolved_later_rule_discards_earlier_rules() {
        let rewriter = Rewriter::new(vec![
            TargetSpec::exact("index.html")
                .rule(rule(r"main.*\.js", r"\{\{JS\}\}"))
                .rule(rule(r"\.css$", r"\{\{CSS\}\}")),
        ]);
        let mut assets: AssetSet = [
            ("index.html", Asset::raw("{{JS}} {{CSS}}")),
            ("main-1.js", Asset::raw("")),
        ]
        .into_iter()
        .collect();

        rewriter.rewrite(&mut assets);

        assert_eq!(text(&assets, "index.html"), "{{JS}} {{CSS}}");
    }

    #[test]
    fn test_unsupported_source_skips_asset_and_continues() {
        let rewriter = Rewriter::new(vec![
            TargetSpec::pattern(Regex::new(r"\.html$").unwrap())
                .rule(rule(r"main.*\.js", r"\{\{JS\}\}")),
            TargetSpec::exact("app.txt").rule(rule(r"main.*\.js", r"\{\{JS\}\}")),
        ]);
        let concat = AssetSource::Concat(vec![AssetSource::Raw(b"{{JS}}".to_vec())]);
        let mut assets: AssetSet = [
            ("index.html", Asset::new(concat.clone())),
            ("about.html", Asset::raw("{{JS}}")),
            ("app.txt", Asset::raw("{{JS}}")),
            ("main-1.js", Asset::raw("")),
        ]
        .into_iter()
        .collect();

        let (report, errors) = rewriter.rewrite(&mut assets);

        assert_eq!(assets.get("index.html").unwrap().source, concat);
        assert_eq!(text(&assets, "about.html"), "main-1.js");
        assert_eq!(text(&assets, "app.txt"), "main-1.js");
        assert_eq!(
            errors,
            vec![RewriteError::UnsupportedSource {
                asset: "index.html".to_owned(),
                kind: SourceKind::Concat,
            }]
        );
        assert!(!report.aborted);
    }

    #[test]
    fn test_unsupported_source_reported_once_across_targets() {
        let rewriter = Rewriter::new(vec![
            TargetSpec::exact("index.html").rule(rule(r"main.*\.js", r"\{\{JS\}\}")),
            TargetSpec::pattern(Regex::new(r"\.html$").unwrap())
                .rule(rule(r"main.*\.js", r"\{\{JS\}\}")),
        ]);
        let concat = AssetSource::Concat(vec![AssetSource::Raw(b"{{JS}}".to_vec())]);
        let mut assets: AssetSet = [
            ("index.html", Asset::new(concat.clone())),
            ("about.html", Asset::raw("{{JS}}")),
            ("main-1.js", Asset::raw("")),
        ]
        .into_iter()
        .collect();

        let (report, errors) = rewriter.rewrite(&mut assets);

        assert_eq!(
            errors,
            vec![RewriteError::UnsupportedSource {
                asset: "index.html".to_owned(),
                kind: SourceKind::Concat,
            }]
        );
        assert_eq!(report.rewritten, vec!["about.html"]);
        assert_eq!(assets.get("index.html").unwrap().source, concat);
    }

    #[test]
    fn test_invalid_utf8_is_skipped() {
        let mut assets: AssetSet = [
            ("index.html", Asset::raw(vec![0xff, 0xfe, b'{'])),
            ("main-1.js", Asset::raw("")),
        ]
        .into_iter()
        .collect();

        let (report, errors) = js_rewriter().rewrite(&mut assets);

        assert_eq!(
            errors,
            vec![RewriteError::InvalidUtf8 {
                asset: "index.html".to_owned(),
            }]
        );
        assert!(report.rewritten.is_empty());
        assert_eq!(
            assets.get("index.html").unwrap().source.as_raw(),
            Some(&[0xff, 0xfe, b'{'][..])
        );
    }

    #[test]
    fn test_rewrite_keeps_emitted_flag() {
        let mut assets: AssetSet = [
            ("index.html", Asset::raw("{{JS}}").emitted()),
            ("main-1.js", Asset::raw("")),
        ]
        .into_iter()
        .collect();

        js_rewriter().rewrite(&mut assets);

        assert!(assets.get("index.html").unwrap().emitted);
        assert_eq!(text(&assets, "index.html"), "main-1.js");
    }

    #[test]
    fn test_after_compile_hook_records_errors() {
        let hook: &dyn AfterCompile = &js_rewriter();
        let mut compilation = Compilation::new();
        compilation.assets.insert("index.html", Asset::raw("{{JS}}"));

        hook.after_compile(&mut compilation);

        assert_eq!(hook.name(), "restamp");
        assert!(compilation.has_errors());
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_each_replacement_is_logged() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let mut assets: AssetSet = [
            ("index.html", Asset::raw("<link href='{{JS}}'><script src='{{JS}}'>")),
            ("main-e4f1.js", Asset::raw("")),
        ]
        .into_iter()
        .collect();

        tracing::subscriber::with_default(subscriber, || {
            js_rewriter().rewrite(&mut assets);
        });

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output
            .lines()
            .filter(|line| line.contains("Replaced placeholder"))
            .collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            assert!(line.contains("asset=\"index.html\""), "{line}");
            assert!(line.contains("matched=\"{{JS}}\""), "{line}");
            assert!(line.contains("resolved=\"main-e4f1.js\""), "{line}");
        }
    }

    #[test]
    fn test_no_targets_is_noop() {
        let mut assets: AssetSet = [("index.html", Asset::raw("{{JS}}"))].into_iter().collect();

        let (report, errors) = Rewriter::new(Vec::new()).rewrite(&mut assets);

        assert_eq!(report, RewriteReport::default());
        assert!(errors.is_empty());
    }
}
