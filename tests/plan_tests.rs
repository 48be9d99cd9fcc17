use camino::Utf8Path;
use floorplan::{Canvas, SourceContext, render_plan};
use lopdf::Document;

/// Page size used for every fixture (the CLI default)
const WIDTH: f64 = 601.0;
const HEIGHT: f64 = 850.0;

/// Fixtures named `*.err.plan` must be rejected with a diagnostic
fn expects_error(path: &Utf8Path) -> bool {
    path.as_str().ends_with(".err.plan")
}

fn render_to_bytes(source: &SourceContext) -> Result<Vec<u8>, miette::Report> {
    let mut canvas = Canvas::new(Vec::new(), WIDTH, HEIGHT)?;
    render_plan(source, &mut canvas)?;
    Ok(canvas.finish()?)
}

fn test_plan_file(path: &Utf8Path) -> datatest_stable::Result<()> {
    let text = std::fs::read_to_string(path)?;
    let source = SourceContext::new(path.as_str(), text);

    match render_to_bytes(&source) {
        Ok(pdf) if expects_error(path) => {
            panic!("{path} rendered ({} bytes) but should have failed", pdf.len());
        }
        Ok(pdf) => {
            let doc = Document::load_mem(&pdf)?;
            assert_eq!(doc.get_pages().len(), 1, "{path}: expected a single page");

            // Same plan, same bytes
            let again = render_to_bytes(&source).map_err(|e| format!("{e:?}"))?;
            assert!(pdf == again, "{path}: output is not deterministic");
        }
        Err(report) if expects_error(path) => {
            // Every rejection points into the plan
            let labels: Vec<_> = report.labels().into_iter().flatten().collect();
            assert!(!labels.is_empty(), "{path}: diagnostic has no source label:\n{report:?}");
        }
        Err(report) => {
            panic!("{path} failed to render:\n{report:?}");
        }
    }

    Ok(())
}

datatest_stable::harness! {
    { test = test_plan_file, root = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/plans"), pattern = r"\.plan$" },
}
