// orchestrator-service-rs/src/app_context.rs
// Composition root: builds every component once, seeds policy data, and owns
// the lifecycle of background work.

use std::sync::Arc;

use config_rs::PipelineSettings;
use llm_client::{provider_from_settings, LanguageModel};
use persistence::{
    default_rules, system_personas, InMemoryFeedbackLoop, InMemoryLedger, InMemoryPersonaStore,
    InMemorySafetyRuleStore,
};
use safety_supervisor::{LlmAuditor, SafetySupervisor};

use crate::classifiers::ClassifierStage;
use crate::context_scout::ContextResolver;
use crate::language::LanguageResolver;
use crate::notifier::{Notifier, SlackNotifier};
use crate::orchestrator::Orchestrator;
use crate::performance::PerformanceAuditor;
use crate::scheduler::FollowUpScheduler;
use crate::synthesizer::DecisionSynthesizer;
use crate::worker::EvaluationWorker;

const WORKER_QUEUE_CAPACITY: usize = 64;

pub struct AppContext {
    pub settings: Arc<PipelineSettings>,
    pub model: Arc<dyn LanguageModel>,
    pub ledger: Arc<InMemoryLedger>,
    pub rules: Arc<InMemorySafetyRuleStore>,
    pub personas: Arc<InMemoryPersonaStore>,
    pub feedback: Arc<InMemoryFeedbackLoop>,
    pub notifier: Arc<dyn Notifier>,
    pub scheduler: Arc<FollowUpScheduler>,
    pub orchestrator: Arc<Orchestrator>,
    pub performance: PerformanceAuditor,
    worker: EvaluationWorker,
}

impl AppContext {
    /// Build from settings with the configured model provider and webhook notifier.
    pub async fn init(settings: PipelineSettings) -> Self {
        let model = provider_from_settings(&settings);
        let notifier: Arc<dyn Notifier> = Arc::new(SlackNotifier::from_settings(&settings));
        Self::with_components(settings, model, notifier).await
    }

    /// Build around an explicit model and notifier.
    pub async fn with_components(
        settings: PipelineSettings,
        model: Arc<dyn LanguageModel>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let settings = Arc::new(settings);
        let cache_ttl = settings.cache_ttl();

        let ledger = Arc::new(InMemoryLedger::from_settings(&settings));
        let rules = Arc::new(InMemorySafetyRuleStore::new(cache_ttl));
        let personas = Arc::new(InMemoryPersonaStore::new(cache_ttl));
        let feedback = Arc::new(InMemoryFeedbackLoop::new(cache_ttl));

        let seeded_rules = rules.seed(default_rules());
        let seeded_personas = personas.seed(system_personas());

        let scheduler = Arc::new(FollowUpScheduler::new(
            Arc::clone(&notifier),
            settings.follow_up_delay(),
        ));

        let auditor = Arc::new(LlmAuditor::from_settings(Arc::clone(&model), &settings));
        let supervisor = SafetySupervisor::from_settings(
            auditor,
            rules.clone(),
            feedback.clone(),
            &settings,
        );

        let orchestrator = Arc::new(Orchestrator {
            classifiers: ClassifierStage::new(Arc::clone(&model)),
            language: LanguageResolver::new(
                Arc::clone(&model),
                personas.clone(),
                settings.default_language.clone(),
            ),
            context: ContextResolver::new(
                Arc::clone(&model),
                ledger.clone(),
                settings.selected_industry.clone(),
            ),
            synthesizer: DecisionSynthesizer::new(Arc::clone(&model), settings.cultural_directness),
            supervisor,
            ledger: ledger.clone(),
            scheduler: Arc::clone(&scheduler),
            classification_timeout: settings.classification_timeout(),
            max_input_chars: settings.max_input_chars,
        });

        let performance = PerformanceAuditor::new(Arc::clone(&model), settings.max_input_chars);

        let worker = EvaluationWorker::start(
            Arc::clone(&orchestrator),
            WORKER_QUEUE_CAPACITY,
            settings.job_retention(),
        );

        tracing::info!(
            provider = model.provider_name(),
            seeded_rules,
            seeded_personas,
            "app_context_initialized"
        );

        Self {
            settings,
            model,
            ledger,
            rules,
            personas,
            feedback,
            notifier,
            scheduler,
            orchestrator,
            performance,
            worker,
        }
    }

    pub fn worker(&self) -> &EvaluationWorker {
        &self.worker
    }

    /// Finish queued jobs, then cancel follow-ups that have not fired.
    pub async fn shutdown(self) {
        self.worker.shutdown().await;
        self.scheduler.shutdown().await;
        tracing::info!("app_context_shutdown");
    }
}
