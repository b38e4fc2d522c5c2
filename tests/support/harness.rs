use std::sync::Arc;

use crossarb::adapter::outbound::audit::MemoryAuditLog;
use crossarb::application::execution::{ExecutionCoordinator, ExecutionSettings};
use crossarb::application::risk::{CooldownScope, CooldownTracker};
use crossarb::domain::RiskPolicy;
use crossarb::testkit::clock::ManualClock;
use crossarb::testkit::domain::instant_policy;
use crossarb::testkit::gateway::ScriptedGateway;
use crossarb::testkit::market::FixedConditions;
use crossarb::testkit::notifier::RecordingNotifier;

/// A coordinator wired to scripted collaborators that tests can inspect.
pub struct Harness {
    pub coordinator: Arc<ExecutionCoordinator>,
    pub gateway: Arc<ScriptedGateway>,
    pub notifier: RecordingNotifier,
    pub audit: MemoryAuditLog,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    /// Instant policy, calm market, global cooldown.
    pub fn new(gateway: ScriptedGateway) -> Self {
        HarnessBuilder::new().gateway(gateway).build()
    }

    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::new()
    }
}

pub struct HarnessBuilder {
    policy: RiskPolicy,
    gateway: ScriptedGateway,
    conditions: FixedConditions,
    scope: CooldownScope,
    settings: ExecutionSettings,
}

impl HarnessBuilder {
    fn new() -> Self {
        Self {
            policy: instant_policy(),
            gateway: ScriptedGateway::new(),
            conditions: FixedConditions::calm(),
            scope: CooldownScope::Global,
            settings: ExecutionSettings::default(),
        }
    }

    pub fn policy(mut self, policy: RiskPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn gateway(mut self, gateway: ScriptedGateway) -> Self {
        self.gateway = gateway;
        self
    }

    pub fn conditions(mut self, conditions: FixedConditions) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn scope(mut self, scope: CooldownScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn settings(mut self, settings: ExecutionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Harness {
        let gateway = Arc::new(self.gateway);
        let notifier = RecordingNotifier::new();
        let audit = MemoryAuditLog::new();
        let clock = Arc::new(ManualClock::default());

        let coordinator = ExecutionCoordinator::new(
            Arc::new(self.policy),
            gateway.clone(),
            Arc::new(self.conditions),
        )
        .with_cooldown(Arc::new(CooldownTracker::new(self.scope)))
        .with_notifier(Arc::new(notifier.clone()))
        .with_audit(Arc::new(audit.clone()))
        .with_clock(clock.clone())
        .with_settings(self.settings);

        Harness {
            coordinator: Arc::new(coordinator),
            gateway,
            notifier,
            audit,
            clock,
        }
    }
}
