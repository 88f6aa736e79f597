use super::*;
use crate::state::test_helpers::{FAKE_PNG, FakeRenderer};

#[tokio::test]
async fn generate_pair_renders_both() {
    let renderer = FakeRenderer::default();
    let pair = generate_pair(&renderer, "A\nB", "X").await;

    let (manual, automation) = pair.into_both().unwrap();
    assert_eq!(manual.kind, DiagramKind::Manual);
    assert_eq!(manual.mermaid_code, diagram::mermaid("A\nB"));
    assert_eq!(manual.png, render::png_data_uri(FAKE_PNG));
    assert_eq!(automation.kind, DiagramKind::Automation);
    assert!(automation.mermaid_code.contains("Step1[\"X\"]"));
    assert_eq!(renderer.call_count(), 2);
}

#[tokio::test]
async fn one_failure_leaves_other_intact() {
    let renderer = FakeRenderer::failing_on("broken step");
    let pair = generate_pair(&renderer, "fine step", "broken step").await;

    let manual = pair.manual.as_ref().unwrap();
    assert!(manual.mermaid_code.contains("fine step"));
    let failure = pair.automation.as_ref().unwrap_err();
    assert_eq!(failure.kind, DiagramKind::Automation);
    assert!(matches!(failure.source, RenderError::Status { status: 503 }));
    assert_eq!(renderer.call_count(), 2);
}

#[tokio::test]
async fn into_both_reports_manual_failure_first() {
    let renderer = FakeRenderer::failing_on("bad");
    let err = generate_pair(&renderer, "bad", "bad").await.into_both().unwrap_err();
    assert_eq!(err.kind, DiagramKind::Manual);
    assert!(err.to_string().starts_with("manual diagram:"));
}
