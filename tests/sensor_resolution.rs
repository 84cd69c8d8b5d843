//! Connect-time sensor resolution tests
//!
//! Missing names are warnings, never fatal. Warnings are counted with a
//! small tracing layer so the logged output is checked, not just the report.

use reflex_circuit::circuit::resolve_sensors;
use reflex_circuit::model::{Component, GolgiTendon, Spindle};
use reflex_circuit::{GainSet, Model, Muscle, ReflexCircuit};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

struct WarnCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn count_warnings<T>(f: impl FnOnce() -> T) -> (T, usize) {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&count)));
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, count.load(Ordering::SeqCst))
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn model() -> Model {
    let mut model = Model::new();
    for muscle in ["soleus", "gastroc", "tibialis"] {
        let id = model
            .add_muscle(Muscle::new(muscle, 0.05, 0.3, 10.0))
            .unwrap();
        model.add_spindle(format!("{}_spindle", muscle), id).unwrap();
        model.add_golgi(format!("{}_golgi", muscle), id).unwrap();
    }
    model
}

#[test]
fn test_all_binds_every_instance_regardless_of_other_names() {
    let model = model();
    let declared = names(&["All", "soleus_spindle", "does_not_exist"]);

    let (resolution, warnings) =
        count_warnings(|| resolve_sensors::<Spindle>("leg", &declared, &model));

    assert_eq!(resolution.len(), 3);
    let order: Vec<_> = resolution.resolved.iter().map(|h| h.index()).collect();
    assert_eq!(order, vec![0, 1, 2]);
    assert_eq!(warnings, 0);
}

#[test]
fn test_one_missing_name_of_three() {
    let model = model();
    let declared = names(&["gastroc_golgi", "hamstring_golgi", "soleus_golgi"]);

    let (resolution, warnings) =
        count_warnings(|| resolve_sensors::<GolgiTendon>("leg", &declared, &model));

    let bound: Vec<_> = resolution
        .resolved
        .iter()
        .filter_map(|h| model.get(*h))
        .map(|g| g.name().to_string())
        .collect();
    assert_eq!(bound, names(&["gastroc_golgi", "soleus_golgi"]));
    assert_eq!(resolution.missing, names(&["hamstring_golgi"]));
    assert_eq!(warnings, 1);
}

#[test]
fn test_name_lookup_is_exact() {
    let model = model();
    let declared = names(&["Soleus_Spindle", "soleus_spindle "]);
    let (resolution, warnings) =
        count_warnings(|| resolve_sensors::<Spindle>("leg", &declared, &model));
    assert!(resolution.is_empty());
    assert_eq!(warnings, 2);
}

/// Spindle and golgi lists resolve independently of each other
#[test]
fn test_circuit_reports_missing_names_per_kind() {
    let model = model();
    let mut circuit = ReflexCircuit::new("leg", "soleus", GainSet::default()).unwrap();
    circuit
        .set_spindles(["soleus_spindle", "ghost_spindle", "tibialis_spindle"])
        .unwrap();
    circuit.set_golgis(["ALL"]).unwrap();

    let (report, warnings) = count_warnings(|| circuit.connect(&model));
    let report = report.unwrap();

    assert_eq!(report.missing_spindles, names(&["ghost_spindle"]));
    assert!(report.missing_golgis.is_empty());
    assert_eq!(circuit.spindles().len(), 2);
    assert_eq!(circuit.golgis().len(), 3);
    // ghost spindle, pair 1 (tibialis spindle vs gastroc golgi), one unpaired golgi
    assert_eq!(report.dropped_pairs, vec![1]);
    assert_eq!(report.unpaired, 1);
    assert_eq!(warnings, report.warning_count());
}
