//! Tests for the local cluster adapter against recording collaborators.

use rollout_core::{GenerationResult, Message, RolloutMode, UsageCounters};
use rollout_error::InferenceErrorKind;
use rollout_interface::{ChatTemplateOptions, ModelServer, RolloutOutput};
use rollout_local::mocks::{RecordingChatTemplate, ScriptedRolloutCluster};
use rollout_local::{AdapterConfig, LocalClusterInferenceAdapter};
use std::sync::Arc;

type Adapter = LocalClusterInferenceAdapter<ScriptedRolloutCluster, RecordingChatTemplate>;

fn adapter(cluster: ScriptedRolloutCluster, micro_batch_size: usize) -> Adapter {
    LocalClusterInferenceAdapter::new(
        cluster,
        micro_batch_size,
        (),
        RecordingChatTemplate::returning("formatted prompt"),
    )
    .expect("valid micro batch size")
}

fn question() -> Vec<Message> {
    vec![Message::user("which is larger 9.9 or 9.11?")]
}

/// Shares collaborators with the adapter so call logs can be read back.
struct Harness {
    cluster: Arc<ScriptedRolloutCluster>,
    template: Arc<RecordingChatTemplate>,
}

impl Harness {
    fn new(cluster: ScriptedRolloutCluster, template: RecordingChatTemplate) -> Self {
        Self {
            cluster: Arc::new(cluster),
            template: Arc::new(template),
        }
    }

    fn adapter(
        &self,
        micro_batch_size: usize,
    ) -> LocalClusterInferenceAdapter<Arc<ScriptedRolloutCluster>, Arc<RecordingChatTemplate>> {
        LocalClusterInferenceAdapter::new(
            Arc::clone(&self.cluster),
            micro_batch_size,
            (),
            Arc::clone(&self.template),
        )
        .expect("valid micro batch size")
    }
}

#[test]
fn test_generate_answers_eval_question() -> anyhow::Result<()> {
    let harness = Harness::new(
        ScriptedRolloutCluster::returning_text(["9.11 is larger than 9.9."]),
        RecordingChatTemplate::returning("formatted prompt"),
    );
    let adapter = harness.adapter(1);
    let messages = question();

    let answer = adapter.generate(&messages, RolloutMode::Eval)?;
    assert_eq!(answer, "9.11 is larger than 9.9.");

    let template_calls = harness.template.calls();
    assert_eq!(template_calls.len(), 1);
    assert_eq!(template_calls[0].messages, messages);
    assert_eq!(
        template_calls[0].options,
        ChatTemplateOptions {
            add_generation_prompt: true,
            tokenize: false,
            enable_thinking: false,
        }
    );

    let rollout_calls = harness.cluster.calls();
    assert_eq!(rollout_calls.len(), 1);
    assert_eq!(rollout_calls[0].prompts, vec!["formatted prompt".to_string()]);
    assert_eq!(rollout_calls[0].mode, RolloutMode::Eval);
    assert_eq!(rollout_calls[0].micro_batch_size.get(), 1);
    Ok(())
}

#[test]
fn test_mode_is_forwarded_unchanged() -> anyhow::Result<()> {
    let harness = Harness::new(
        ScriptedRolloutCluster::returning_text(["ok"]),
        RecordingChatTemplate::new(),
    );
    let adapter = harness.adapter(1);

    adapter.generate(&question(), RolloutMode::Train)?;
    adapter.generate(&question(), RolloutMode::Eval)?;
    // The capability entry point uses the default mode
    ModelServer::generate(&adapter, &question())?;

    let modes: Vec<RolloutMode> = harness.cluster.calls().iter().map(|c| c.mode).collect();
    assert_eq!(
        modes,
        vec![RolloutMode::Train, RolloutMode::Eval, RolloutMode::Train]
    );
    Ok(())
}

#[test]
fn test_micro_batch_size_ignores_conversation_length() -> anyhow::Result<()> {
    let harness = Harness::new(
        ScriptedRolloutCluster::returning_text(["ok"]),
        RecordingChatTemplate::new(),
    );
    let adapter = harness.adapter(16);

    let conversation = vec![
        Message::system("You are a careful assistant."),
        Message::user("What is 2+2?"),
        Message::assistant("4"),
        Message::user("And 3+3?"),
    ];
    adapter.generate(&conversation, RolloutMode::Train)?;
    adapter.generate(&conversation[..1], RolloutMode::Train)?;

    let calls = harness.cluster.calls();
    assert_eq!(calls.len(), 2);
    for call in &calls {
        assert_eq!(call.micro_batch_size.get(), 16);
        assert_eq!(call.prompts.len(), 1);
    }
    // The whole conversation is rendered into the single prompt
    assert_eq!(
        calls[0].prompts[0],
        "<|system|>You are a careful assistant.<|user|>What is 2+2?<|assistant|>4<|user|>And 3+3?<|assistant|>"
    );
    Ok(())
}

#[test]
fn test_returns_first_candidate() -> anyhow::Result<()> {
    let adapter = adapter(ScriptedRolloutCluster::returning_text(["first", "second"]), 2);
    assert_eq!(adapter.generate(&question(), RolloutMode::Train)?, "first");
    Ok(())
}

#[test]
fn test_empty_messages_is_invalid_input() {
    let harness = Harness::new(
        ScriptedRolloutCluster::returning_text(["unused"]),
        RecordingChatTemplate::new(),
    );
    let adapter = harness.adapter(1);

    let err = adapter.generate(&[], RolloutMode::Train).unwrap_err();
    assert!(matches!(err.kind(), InferenceErrorKind::InvalidInput(_)));
    assert!(harness.template.calls().is_empty());
    assert!(harness.cluster.calls().is_empty());
}

#[test]
fn test_empty_rollout_is_distinct_error() {
    let adapter = adapter(
        ScriptedRolloutCluster::returning_text(Vec::<String>::new()),
        1,
    );
    let err = adapter.generate(&question(), RolloutMode::Train).unwrap_err();
    assert_eq!(err.kind(), &InferenceErrorKind::EmptyRollout);
}

#[test]
fn test_missing_text_is_backend_unavailable() {
    let adapter = adapter(ScriptedRolloutCluster::returning(RolloutOutput::default()), 1);
    let err = adapter.generate(&question(), RolloutMode::Train).unwrap_err();
    assert!(matches!(
        err.kind(),
        InferenceErrorKind::BackendUnavailable(_)
    ));
}

#[test]
fn test_cluster_failure_is_backend_unavailable() {
    let adapter = adapter(ScriptedRolloutCluster::failing("device mesh lost"), 1);
    let err = adapter.generate(&question(), RolloutMode::Eval).unwrap_err();
    match err.kind() {
        InferenceErrorKind::BackendUnavailable(message) => {
            assert!(message.contains("device mesh lost"));
        }
        other => panic!("unexpected error kind: {other}"),
    }
}

#[test]
fn test_template_failure_skips_rollout() {
    let harness = Harness::new(
        ScriptedRolloutCluster::returning_text(["unused"]),
        RecordingChatTemplate::failing("no chat template configured"),
    );
    let adapter = harness.adapter(1);

    let err = adapter.generate(&question(), RolloutMode::Train).unwrap_err();
    assert!(matches!(
        err.kind(),
        InferenceErrorKind::BackendUnavailable(_)
    ));
    assert!(harness.cluster.calls().is_empty());
}

#[test]
fn test_model_server_keeps_backend_metadata() -> anyhow::Result<()> {
    let mut usage = UsageCounters::new();
    usage.insert("completion_tokens".to_string(), 12);
    let output = RolloutOutput::builder()
        .text(Some(vec!["truncated answ".to_string()]))
        .finish_reasons(Some(vec!["length".to_string()]))
        .usage(Some(usage.clone()))
        .raw(Some(serde_json::json!({"step": 3})))
        .build()?;
    let adapter = adapter(ScriptedRolloutCluster::returning(output), 1);

    let server: &dyn ModelServer = &adapter;
    let result = server.generate(&question())?;

    assert_eq!(result.text(), "truncated answ");
    assert_eq!(result.finish_reason(), "length");
    assert_eq!(result.usage().as_ref(), Some(&usage));
    assert_eq!(*result.raw(), Some(serde_json::json!({"step": 3})));
    Ok(())
}

#[test]
fn test_finish_reason_defaults_to_stop() -> anyhow::Result<()> {
    let adapter = adapter(ScriptedRolloutCluster::returning_text(["done"]), 1);
    let result = adapter.generate_result(&question(), RolloutMode::Eval)?;
    assert_eq!(result, GenerationResult::new("done"));
    Ok(())
}

#[test]
fn test_generation_config_is_held_unmodified() -> anyhow::Result<()> {
    #[derive(Debug, PartialEq)]
    struct GrpoConfig {
        num_generations: usize,
        beta: f64,
    }

    let config = AdapterConfig::new(4)?;
    let adapter = LocalClusterInferenceAdapter::from_config(
        ScriptedRolloutCluster::returning_text(["ok"]),
        &config,
        GrpoConfig {
            num_generations: 2,
            beta: 0.04,
        },
        RecordingChatTemplate::new(),
    );

    assert_eq!(adapter.micro_batch_size().get(), 4);
    assert_eq!(
        adapter.generation_config(),
        &GrpoConfig {
            num_generations: 2,
            beta: 0.04,
        }
    );
    Ok(())
}

#[test]
fn test_concurrent_callers_share_one_adapter() -> anyhow::Result<()> {
    let harness = Harness::new(
        ScriptedRolloutCluster::returning_text(["ok"]),
        RecordingChatTemplate::new(),
    );
    let adapter = Arc::new(harness.adapter(1));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let adapter = Arc::clone(&adapter);
            std::thread::spawn(move || {
                // Deref first: `Arc<_>` itself implements `ModelServer`
                (*adapter).generate(&[Message::user(format!("question {i}"))], RolloutMode::Eval)
            })
        })
        .collect();

    for handle in handles {
        let answer = handle.join().expect("worker panicked")?;
        assert_eq!(answer, "ok");
    }
    let calls = harness.cluster.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls.iter().all(|c| c.mode == RolloutMode::Eval));
    assert_eq!(harness.template.calls().len(), 4);
    Ok(())
}

/// Collects formatted log lines in memory.
#[derive(Clone, Default)]
struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn contents(&self) -> String {
        let bytes = self
            .0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

#[test]
fn test_extra_candidates_warn_and_return_first() -> anyhow::Result<()> {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let adapter = adapter(
        ScriptedRolloutCluster::returning_text(["first", "second", "third"]),
        1,
    );
    let answer = tracing::subscriber::with_default(subscriber, || {
        adapter.generate(&question(), RolloutMode::Eval)
    })?;

    assert_eq!(answer, "first");
    let output = logs.contents();
    assert!(output.contains("WARN"), "no warning logged: {output}");
    assert!(output.contains("Rollout output is not aligned with prompts"));
    assert!(output.contains("candidates=3"));
    Ok(())
}

#[test]
fn test_aligned_output_logs_no_warning() -> anyhow::Result<()> {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let adapter = adapter(ScriptedRolloutCluster::returning_text(["only"]), 1);
    tracing::subscriber::with_default(subscriber, || {
        adapter.generate(&question(), RolloutMode::Eval)
    })?;

    assert!(!logs.contents().contains("not aligned"));
    Ok(())
}
