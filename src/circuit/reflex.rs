//! Muscle stretch reflex circuit
//!
//! A circuit listens to spindle and golgi tendon sensors and turns their
//! readings into muscle excitation. Which pipeline runs is decided by what is
//! wired when the circuit connects:
//!
//! - **Direct**: no interneuron/delay. Every spindle/golgi pair contributes
//!   gain-weighted, rectified, normalized afferents straight into its
//!   muscle's slot of the controls vector.
//! - **Delayed**: one spindle and one golgi feed an interneuron whose output
//!   passes through a delay line. The delayed signal is stored and read back
//!   with [`ReflexCircuit::get_muscle_signal`]; it is never written into the
//!   controls vector.

use crate::circuit::delay::DelayLine;
use crate::circuit::interneuron::Interneuron;
use crate::circuit::resolve::resolve_sensors;
use crate::core::config::{CircuitConfig, DelayConfig, GainSet, InterneuronConfig};
use crate::core::error::{ReflexError, Result};
use crate::core::types::rectify;
use crate::model::{
    Component, GolgiId, GolgiTendon, Model, Muscle, MuscleId, Sensor, SimContext, SimState,
    Spindle, SpindleId,
};

/// Afferents fed to the interneuron: stretch, stretch velocity, tendon stretch
pub const AFFERENT_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitMode {
    /// Gain combination written into the controls vector
    Direct,
    /// Interneuron + delay line, read on demand
    Delayed,
}

impl CircuitMode {
    pub fn label(&self) -> &'static str {
        match self {
            CircuitMode::Direct => "direct",
            CircuitMode::Delayed => "delayed",
        }
    }
}

/// Spindle and golgi tendon on the same muscle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorPair {
    pub spindle: SpindleId,
    pub golgi: GolgiId,
    pub muscle: MuscleId,
}

/// Recoverable findings from [`ReflexCircuit::connect`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectReport {
    pub mode: CircuitMode,
    pub missing_spindles: Vec<String>,
    pub missing_golgis: Vec<String>,
    /// Pair indices dropped because spindle and golgi sit on different muscles
    pub dropped_pairs: Vec<usize>,
    /// Entries past the end of the shorter list
    pub unpaired: usize,
}

impl ConnectReport {
    fn new(mode: CircuitMode) -> Self {
        Self {
            mode,
            missing_spindles: Vec::new(),
            missing_golgis: Vec::new(),
            dropped_pairs: Vec::new(),
            unpaired: 0,
        }
    }

    pub fn warning_count(&self) -> usize {
        self.missing_spindles.len()
            + self.missing_golgis.len()
            + self.dropped_pairs.len()
            + usize::from(self.unpaired > 0)
    }
}

#[derive(Debug, Clone)]
enum Wiring {
    Direct {
        pairs: Vec<SensorPair>,
    },
    Delayed {
        pair: SensorPair,
        interneuron: Interneuron,
        delay: DelayLine,
    },
}

/// Direct-pipeline excitation for one sensor pair.
///
/// Each afferent is rectified (only lengthening excites) and normalized by
/// the muscle's own reference scale before gains apply.
pub fn direct_excitation(
    gains: &GainSet,
    muscle: &Muscle,
    stretch: f64,
    speed: f64,
    tendon: f64,
) -> f64 {
    gains.gain_length * rectify(stretch) / muscle.optimal_fiber_length
        + gains.gain_velocity * rectify(speed) / muscle.max_fiber_speed()
        + gains.gain_tendon * rectify(tendon) / muscle.tendon_slack_length
}

#[derive(Debug, Clone)]
pub struct ReflexCircuit {
    config: CircuitConfig,
    muscle: Option<MuscleId>,
    spindles: Vec<SpindleId>,
    golgis: Vec<GolgiId>,
    wiring: Option<Wiring>,
    running: bool,
    interneuron_signal: Option<f64>,
    last_signal: Option<f64>,
}

impl ReflexCircuit {
    /// Direct-pipeline circuit on `muscle` with no sensors declared yet
    pub fn new(name: &str, muscle: &str, gains: GainSet) -> Result<Self> {
        let mut config = CircuitConfig::new(name, muscle);
        config.gains = gains;
        Self::from_config(config)
    }

    pub fn from_config(config: CircuitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            muscle: None,
            spindles: Vec::new(),
            golgis: Vec::new(),
            wiring: None,
            running: false,
            interneuron_signal: None,
            last_signal: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &CircuitConfig {
        &self.config
    }

    pub fn gains(&self) -> &GainSet {
        &self.config.gains
    }

    /// Mode selected by the configured stages
    pub fn mode(&self) -> CircuitMode {
        if self.config.interneuron.is_some() && self.config.delay.is_some() {
            CircuitMode::Delayed
        } else {
            CircuitMode::Direct
        }
    }

    pub fn is_connected(&self) -> bool {
        self.wiring.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // === DECLARED CONFIGURATION ===

    /// Configuration changes drop the current wiring; mid-run they are refused
    fn reconfigure(&mut self) -> Result<&mut CircuitConfig> {
        if self.running {
            return Err(ReflexError::ReconfigureDuringRun(self.config.name.clone()));
        }
        self.wiring = None;
        self.muscle = None;
        self.spindles.clear();
        self.golgis.clear();
        Ok(&mut self.config)
    }

    pub fn spindle_list(&self) -> &[String] {
        &self.config.spindle_list
    }

    /// Replace the declared spindle names
    pub fn set_spindles<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = self.reconfigure()?;
        config.spindle_list = names.into_iter().map(Into::into).collect();
        Ok(())
    }

    /// Declare one more spindle; already-declared names are left alone
    pub fn add_spindle(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let config = self.reconfigure()?;
        if !config.spindle_list.contains(&name) {
            config.spindle_list.push(name);
        }
        Ok(())
    }

    pub fn golgi_list(&self) -> &[String] {
        &self.config.golgi_list
    }

    pub fn set_golgis<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = self.reconfigure()?;
        config.golgi_list = names.into_iter().map(Into::into).collect();
        Ok(())
    }

    pub fn add_golgi(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let config = self.reconfigure()?;
        if !config.golgi_list.contains(&name) {
            config.golgi_list.push(name);
        }
        Ok(())
    }

    pub fn set_gains(&mut self, gains: GainSet) -> Result<()> {
        self.reconfigure()?.gains = gains;
        Ok(())
    }

    pub fn set_interneuron(&mut self, interneuron: Option<InterneuronConfig>) -> Result<()> {
        self.reconfigure()?.interneuron = interneuron;
        Ok(())
    }

    pub fn set_delay(&mut self, delay: Option<DelayConfig>) -> Result<()> {
        if let Some(delay) = &delay {
            delay.validate()?;
        }
        self.reconfigure()?.delay = delay;
        Ok(())
    }

    // === CONNECTION ===

    /// Resolve sockets and sensor names against an assembled model.
    ///
    /// Fatal problems (unresolved muscle, degenerate muscle parameters,
    /// impossible wiring) leave the circuit unconnected. Missing sensor names
    /// and unusable pairs are logged and returned in the report.
    pub fn connect(&mut self, model: &Model) -> Result<ConnectReport> {
        self.reconfigure()?;
        self.config.validate()?;

        let name = self.config.name.clone();
        let muscle = model
            .find::<Muscle>(&self.config.muscle)
            .ok_or_else(|| ReflexError::UnconnectedSocket {
                circuit: name.clone(),
                socket: "muscle",
            })?;
        model.require(muscle)?.validate_for_reflex()?;

        let spindles = resolve_sensors::<Spindle>(&name, &self.config.spindle_list, model);
        let golgis = resolve_sensors::<GolgiTendon>(&name, &self.config.golgi_list, model);

        let mut report = ConnectReport::new(self.mode());
        report.missing_spindles = spindles.missing;
        report.missing_golgis = golgis.missing;

        let wiring = match (&self.config.interneuron, &self.config.delay) {
            (Some(interneuron), Some(delay)) => self.wire_delayed(
                model,
                muscle,
                &spindles.resolved,
                &golgis.resolved,
                interneuron,
                delay,
            )?,
            _ => self.wire_direct(model, &spindles.resolved, &golgis.resolved, &mut report)?,
        };

        let pair_count = match &wiring {
            Wiring::Direct { pairs } => pairs.len(),
            Wiring::Delayed { .. } => 1,
        };
        tracing::debug!(
            "{}: connected in {} mode with {} sensor pair(s), {} warning(s)",
            name,
            report.mode.label(),
            pair_count,
            report.warning_count()
        );

        self.muscle = Some(muscle);
        self.spindles = spindles.resolved;
        self.golgis = golgis.resolved;
        self.wiring = Some(wiring);
        self.interneuron_signal = None;
        self.last_signal = None;
        Ok(report)
    }

    fn wire_direct(
        &self,
        model: &Model,
        spindles: &[SpindleId],
        golgis: &[GolgiId],
        report: &mut ConnectReport,
    ) -> Result<Wiring> {
        let name = self.name();
        let mut pairs = Vec::with_capacity(spindles.len().min(golgis.len()));

        for (i, (&spindle_id, &golgi_id)) in spindles.iter().zip(golgis).enumerate() {
            let spindle = model.require(spindle_id)?;
            let golgi = model.require(golgi_id)?;

            if spindle.muscle() != golgi.muscle() {
                tracing::warn!(
                    "{}: spindle {:?} and golgi tendon {:?} are on different muscles; pair {} ignored",
                    name,
                    spindle.name(),
                    golgi.name(),
                    i
                );
                report.dropped_pairs.push(i);
                continue;
            }

            // Pairs excite the muscle their sensors sit on
            let muscle = spindle.muscle();
            model.require(muscle)?.validate_for_reflex()?;
            pairs.push(SensorPair {
                spindle: spindle_id,
                golgi: golgi_id,
                muscle,
            });
        }

        report.unpaired = spindles.len().abs_diff(golgis.len());
        if report.unpaired > 0 {
            tracing::warn!(
                "{}: {} spindle(s) and {} golgi tendon(s) resolved; {} unpaired sensor(s) unused",
                name,
                spindles.len(),
                golgis.len(),
                report.unpaired
            );
        }

        Ok(Wiring::Direct { pairs })
    }

    fn wire_delayed(
        &self,
        model: &Model,
        muscle: MuscleId,
        spindles: &[SpindleId],
        golgis: &[GolgiId],
        interneuron: &InterneuronConfig,
        delay: &DelayConfig,
    ) -> Result<Wiring> {
        let spindle_id = self.single(spindles, "spindle")?;
        let golgi_id = self.single(golgis, "golgi")?;

        let spindle = model.require(spindle_id)?;
        let golgi = model.require(golgi_id)?;
        for (kind, sensor_name, sensor_muscle) in [
            ("spindle", spindle.name(), spindle.muscle()),
            ("golgi tendon", golgi.name(), golgi.muscle()),
        ] {
            if sensor_muscle != muscle {
                return Err(ReflexError::InconsistentWiring {
                    circuit: self.config.name.clone(),
                    reason: format!(
                        "{} {:?} is not attached to muscle {:?}",
                        kind, sensor_name, self.config.muscle
                    ),
                });
            }
        }

        Ok(Wiring::Delayed {
            pair: SensorPair {
                spindle: spindle_id,
                golgi: golgi_id,
                muscle,
            },
            interneuron: Interneuron::new(interneuron, AFFERENT_COUNT)?,
            delay: DelayLine::new(delay)?,
        })
    }

    /// The delayed pipeline takes exactly one sensor per socket
    fn single<T: Copy>(&self, resolved: &[T], socket: &'static str) -> Result<T> {
        match resolved {
            [only] => Ok(*only),
            [] => Err(ReflexError::UnconnectedSocket {
                circuit: self.config.name.clone(),
                socket,
            }),
            many => Err(ReflexError::InconsistentWiring {
                circuit: self.config.name.clone(),
                reason: format!(
                    "delayed mode takes one {} sensor, {} resolved",
                    socket,
                    many.len()
                ),
            }),
        }
    }

    // === RESOLVED COMPONENTS ===

    /// The muscle socket target (after connect)
    pub fn muscle(&self) -> Option<MuscleId> {
        self.muscle
    }

    pub fn spindles(&self) -> &[SpindleId] {
        &self.spindles
    }

    pub fn golgis(&self) -> &[GolgiId] {
        &self.golgis
    }

    /// Sensor pairs in use (one in delayed mode)
    pub fn pairs(&self) -> &[SensorPair] {
        match &self.wiring {
            Some(Wiring::Direct { pairs }) => pairs,
            Some(Wiring::Delayed { pair, .. }) => std::slice::from_ref(pair),
            None => &[],
        }
    }

    pub fn interneuron(&self) -> Option<&Interneuron> {
        match &self.wiring {
            Some(Wiring::Delayed { interneuron, .. }) => Some(interneuron),
            _ => None,
        }
    }

    pub fn delay_line(&self) -> Option<&DelayLine> {
        match &self.wiring {
            Some(Wiring::Delayed { delay, .. }) => Some(delay),
            _ => None,
        }
    }

    // === EVALUATION ===

    /// Add reflex excitation into `controls` (direct mode).
    ///
    /// Delayed-mode circuits leave `controls` untouched; their output is read
    /// through [`ReflexCircuit::get_muscle_signal`].
    pub fn compute_controls(&mut self, ctx: &SimContext<'_>, controls: &mut [f64]) -> Result<()> {
        let wiring = self
            .wiring
            .as_ref()
            .ok_or_else(|| ReflexError::NotConnected(self.config.name.clone()))?;

        let expected = ctx.model.actuator_count();
        if controls.len() < expected {
            return Err(ReflexError::ControlsTooShort {
                expected,
                found: controls.len(),
            });
        }

        if let Wiring::Direct { pairs } = wiring {
            for pair in pairs {
                let spindle = ctx.model.require(pair.spindle)?;
                let golgi = ctx.model.require(pair.golgi)?;
                let muscle = ctx.model.require(pair.muscle)?;

                let control = direct_excitation(
                    &self.config.gains,
                    muscle,
                    spindle.length(ctx.state),
                    spindle.speed(ctx.state),
                    golgi.tendon_length(ctx.state),
                );
                tracing::trace!("{}: {} += {}", self.config.name, muscle.name, control);
                muscle.add_excitation(pair.muscle, controls, control)?;
            }
        }

        self.running = true;
        Ok(())
    }

    /// Evaluate the delayed pipeline at the context's time (delayed mode).
    ///
    /// Records the interneuron output in the delay line and returns the value
    /// it held `delay_time` earlier, or the configured default.
    pub fn get_muscle_signal(&mut self, ctx: &SimContext<'_>) -> Result<f64> {
        let (pair, interneuron, delay) = match self.wiring.as_mut() {
            Some(Wiring::Delayed {
                pair,
                interneuron,
                delay,
            }) => (*pair, interneuron, delay),
            Some(Wiring::Direct { .. }) => {
                return Err(ReflexError::ModeMismatch {
                    circuit: self.config.name.clone(),
                    mode: CircuitMode::Direct.label(),
                    operation: "get_muscle_signal",
                })
            }
            None => return Err(ReflexError::NotConnected(self.config.name.clone())),
        };

        let spindle = ctx.model.require(pair.spindle)?;
        let golgi = ctx.model.require(pair.golgi)?;
        let afferents = [
            spindle.length(ctx.state),
            spindle.speed(ctx.state),
            golgi.tendon_length(ctx.state),
        ];

        let signal = interneuron.evaluate(&afferents);
        let delayed = delay.evaluate(ctx.time(), signal);

        self.interneuron_signal = Some(signal);
        self.last_signal = Some(delayed);
        self.running = true;
        Ok(delayed)
    }

    /// Interneuron output from the last delayed-mode evaluation
    pub fn interneuron_signal(&self) -> Option<f64> {
        self.interneuron_signal
    }

    /// Delayed signal published by the last delayed-mode evaluation
    pub fn last_signal(&self) -> Option<f64> {
        self.last_signal
    }

    /// The step ending at `state.time()` is final; forget unreachable history
    pub fn accept_step(&mut self, state: &SimState) {
        if let Some(Wiring::Delayed { delay, .. }) = self.wiring.as_mut() {
            delay.prune(state.time());
        }
    }

    /// Finish the current run. History is cleared and configuration unlocks.
    pub fn end_run(&mut self) {
        if let Some(Wiring::Delayed { delay, .. }) = self.wiring.as_mut() {
            delay.clear();
        }
        self.running = false;
        self.interneuron_signal = None;
        self.last_signal = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MuscleKinematics;

    struct Leg {
        model: Model,
        soleus: MuscleId,
        vasti: MuscleId,
    }

    fn leg() -> Leg {
        let mut model = Model::new();
        let soleus = model.add_muscle(Muscle::new("soleus", 0.1, 0.25, 10.0)).unwrap();
        let vasti = model.add_muscle(Muscle::new("vasti", 0.09, 0.22, 12.0)).unwrap();
        model.add_spindle("soleus_spindle", soleus).unwrap();
        model.add_golgi("soleus_golgi", soleus).unwrap();
        model.add_spindle("vasti_spindle", vasti).unwrap();
        model.add_golgi("vasti_golgi", vasti).unwrap();
        Leg { model, soleus, vasti }
    }

    fn delayed_circuit() -> ReflexCircuit {
        let mut config = CircuitConfig::new("ankle", "soleus");
        config.spindle_list = vec!["soleus_spindle".into()];
        config.golgi_list = vec!["soleus_golgi".into()];
        config.interneuron = Some(InterneuronConfig {
            weights: vec![1.0, 1.0, 1.0],
            threshold: 0.5,
        });
        config.delay = Some(DelayConfig::new(0.1, -1.0));
        ReflexCircuit::from_config(config).unwrap()
    }

    #[test]
    fn test_new_rejects_empty_name() {
        let err = ReflexCircuit::new("", "soleus", GainSet::default()).unwrap_err();
        assert!(matches!(err, ReflexError::EmptyName(_)));
    }

    #[test]
    fn test_mode_follows_configured_stages() {
        let direct = ReflexCircuit::new("c", "soleus", GainSet::default()).unwrap();
        assert_eq!(direct.mode(), CircuitMode::Direct);
        assert_eq!(delayed_circuit().mode(), CircuitMode::Delayed);
    }

    #[test]
    fn test_add_spindle_skips_known_names() {
        let mut c = ReflexCircuit::new("c", "soleus", GainSet::default()).unwrap();
        c.add_spindle("a").unwrap();
        c.add_spindle("b").unwrap();
        c.add_spindle("a").unwrap();
        assert_eq!(c.spindle_list(), ["a", "b"]);

        c.set_spindles(["z"]).unwrap();
        assert_eq!(c.spindle_list(), ["z"]);
    }

    #[test]
    fn test_unknown_muscle_is_fatal() {
        let leg = leg();
        let mut c = ReflexCircuit::new("c", "gastroc", GainSet::default()).unwrap();
        let err = c.connect(&leg.model).unwrap_err();
        assert!(matches!(err, ReflexError::UnconnectedSocket { socket: "muscle", .. }));
        assert!(!c.is_connected());
    }

    #[test]
    fn test_direct_pairs_by_index() {
        let leg = leg();
        let mut c = ReflexCircuit::new("c", "soleus", GainSet::default()).unwrap();
        c.set_spindles(["ALL"]).unwrap();
        c.set_golgis(["ALL"]).unwrap();
        let report = c.connect(&leg.model).unwrap();

        assert_eq!(report.warning_count(), 0);
        let muscles: Vec<_> = c.pairs().iter().map(|p| p.muscle).collect();
        assert_eq!(muscles, vec![leg.soleus, leg.vasti]);
    }

    #[test]
    fn test_cross_muscle_pair_dropped() {
        let leg = leg();
        let mut c = ReflexCircuit::new("c", "soleus", GainSet::default()).unwrap();
        c.set_spindles(["soleus_spindle", "vasti_spindle"]).unwrap();
        c.set_golgis(["vasti_golgi", "vasti_golgi"]).unwrap();
        let report = c.connect(&leg.model).unwrap();

        // Duplicate golgi binds once, so only one pair is formed and it is dropped
        assert_eq!(report.dropped_pairs, vec![0]);
        assert_eq!(report.unpaired, 1);
        assert!(c.pairs().is_empty());
    }

    #[test]
    fn test_direct_excitation_formula() {
        let muscle = Muscle::new("m", 0.1, 0.2, 10.0);
        let gains = GainSet::new(1.0, 2.0, 3.0);
        let value = direct_excitation(&gains, &muscle, 0.01, 0.5, 0.02);
        let expected = 0.01 / 0.1 + 2.0 * 0.5 / 1.0 + 3.0 * 0.02 / 0.2;
        assert!((value - expected).abs() < 1e-12);
    }

    #[test]
    fn test_direct_excitation_ignores_shortening() {
        let muscle = Muscle::new("m", 0.1, 0.2, 10.0);
        let value = direct_excitation(&GainSet::default(), &muscle, -0.01, -0.5, -0.02);
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_compute_controls_requires_connect() {
        let leg = leg();
        let state = SimState::for_model(&leg.model, 0.0);
        let mut c = ReflexCircuit::new("c", "soleus", GainSet::default()).unwrap();
        let mut controls = vec![0.0; 2];
        let err = c
            .compute_controls(&SimContext::new(&leg.model, &state), &mut controls)
            .unwrap_err();
        assert!(matches!(err, ReflexError::NotConnected(_)));
    }

    #[test]
    fn test_compute_controls_rejects_short_vector() {
        let leg = leg();
        let state = SimState::for_model(&leg.model, 0.0);
        let mut c = ReflexCircuit::new("c", "soleus", GainSet::default()).unwrap();
        c.connect(&leg.model).unwrap();
        let mut controls = vec![0.0; 1];
        let err = c
            .compute_controls(&SimContext::new(&leg.model, &state), &mut controls)
            .unwrap_err();
        assert!(matches!(err, ReflexError::ControlsTooShort { expected: 2, found: 1 }));
    }

    #[test]
    fn test_delayed_mode_does_not_write_controls() {
        let leg = leg();
        let mut state = SimState::for_model(&leg.model, 0.0);
        state.set_kinematics(leg.soleus, MuscleKinematics::new(0.3, 0.1, 0.2));
        let mut c = delayed_circuit();
        c.connect(&leg.model).unwrap();

        let mut controls = vec![0.5, 0.5];
        c.compute_controls(&SimContext::new(&leg.model, &state), &mut controls)
            .unwrap();
        assert_eq!(controls, vec![0.5, 0.5]);
    }

    #[test]
    fn test_signal_accessor_rejected_in_direct_mode() {
        let leg = leg();
        let state = SimState::for_model(&leg.model, 0.0);
        let mut c = ReflexCircuit::new("c", "soleus", GainSet::default()).unwrap();
        c.connect(&leg.model).unwrap();
        let err = c
            .get_muscle_signal(&SimContext::new(&leg.model, &state))
            .unwrap_err();
        assert!(matches!(err, ReflexError::ModeMismatch { mode: "direct", .. }));
    }

    #[test]
    fn test_delayed_requires_one_spindle() {
        let leg = leg();
        let mut c = delayed_circuit();
        c.set_spindles(Vec::<String>::new()).unwrap();
        let err = c.connect(&leg.model).unwrap_err();
        assert!(matches!(err, ReflexError::UnconnectedSocket { socket: "spindle", .. }));

        c.set_spindles(["ALL"]).unwrap();
        let err = c.connect(&leg.model).unwrap_err();
        assert!(matches!(err, ReflexError::InconsistentWiring { .. }));
    }

    #[test]
    fn test_delayed_rejects_foreign_muscle_sensor() {
        let leg = leg();
        let mut c = delayed_circuit();
        c.set_golgis(["vasti_golgi"]).unwrap();
        let err = c.connect(&leg.model).unwrap_err();
        assert!(matches!(err, ReflexError::InconsistentWiring { .. }));
    }

    #[test]
    fn test_delayed_weight_count_mismatch_is_fatal() {
        let leg = leg();
        let mut c = delayed_circuit();
        c.set_interneuron(Some(InterneuronConfig {
            weights: vec![1.0, 1.0],
            threshold: 0.5,
        }))
        .unwrap();
        let err = c.connect(&leg.model).unwrap_err();
        assert!(matches!(
            err,
            ReflexError::WeightCountMismatch { expected: 3, found: 2 }
        ));
    }

    #[test]
    fn test_reconfigure_during_run_fails() {
        let leg = leg();
        let state = SimState::for_model(&leg.model, 0.0);
        let mut c = delayed_circuit();
        c.connect(&leg.model).unwrap();
        c.get_muscle_signal(&SimContext::new(&leg.model, &state))
            .unwrap();
        assert!(c.is_running());

        let err = c.set_gains(GainSet::new(2.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, ReflexError::ReconfigureDuringRun(_)));
        assert!(matches!(
            c.connect(&leg.model),
            Err(ReflexError::ReconfigureDuringRun(_))
        ));
        // Still wired after the refused change
        assert!(c.is_connected());

        c.end_run();
        c.set_gains(GainSet::new(2.0, 0.0, 0.0)).unwrap();
        assert!(!c.is_connected());
        c.connect(&leg.model).unwrap();
    }

    #[test]
    fn test_end_run_clears_history() {
        let leg = leg();
        let mut state = SimState::for_model(&leg.model, 0.0);
        state.set_kinematics(leg.soleus, MuscleKinematics::new(0.3, 0.1, 0.2));
        let mut c = delayed_circuit();
        c.connect(&leg.model).unwrap();
        c.get_muscle_signal(&SimContext::new(&leg.model, &state))
            .unwrap();
        assert_eq!(c.delay_line().map(|d| d.len()), Some(1));

        c.end_run();
        assert_eq!(c.delay_line().map(|d| d.len()), Some(0));
        assert_eq!(c.last_signal(), None);
    }
}
