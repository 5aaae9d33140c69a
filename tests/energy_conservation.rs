use chainsim::math::{AdaptiveIntegrator, TableauVariant};
use chainsim::models::ChainModel;

fn total_energy(integrator: &AdaptiveIntegrator<ChainModel>) -> f64 {
    let chain = integrator.derivative();
    let (theta, omega) = chain.split_state(integrator.state()).unwrap();
    chain.total_energy(theta, omega).unwrap()
}

fn max_relative_drift(links: usize, variant: TableauVariant, dt: f64, steps: usize) -> f64 {
    let chain = ChainModel::new(links).unwrap();
    let state = chain.initial_hanging_state(1.0, 0.5);
    let mut integrator = AdaptiveIntegrator::new(chain, state, variant);

    let initial = total_energy(&integrator);
    assert!(initial.abs() > 0.1);

    let mut worst: f64 = 0.0;
    for _ in 0..steps {
        integrator.step(dt, true).unwrap();
        let drift = (total_energy(&integrator) - initial).abs() / initial.abs();
        worst = worst.max(drift);
    }
    worst
}

#[test]
fn energy_is_conserved_with_fehlberg() {
    for links in [1, 2, 5] {
        let drift = max_relative_drift(links, TableauVariant::Fehlberg45, 0.005, 400);
        assert!(drift < 1e-3, "N = {links}: drift {drift}");
    }
}

#[test]
fn energy_is_conserved_with_dormand_prince() {
    for links in [1, 2, 5] {
        let drift = max_relative_drift(links, TableauVariant::DormandPrince54, 0.005, 400);
        assert!(drift < 1e-3, "N = {links}: drift {drift}");
    }
}

#[test]
fn error_estimate_shrinks_with_step_size() {
    let chain = ChainModel::new(3).unwrap();
    let state = chain.initial_hanging_state(1.0, 0.5);

    let mut coarse =
        AdaptiveIntegrator::new(chain.clone(), state.clone(), TableauVariant::Fehlberg45);
    coarse.step(0.1, true).unwrap();

    let mut fine = AdaptiveIntegrator::new(chain, state, TableauVariant::Fehlberg45);
    fine.step(0.01, true).unwrap();

    assert!(fine.error() < coarse.error());
}

#[test]
fn hanging_state_starts_at_rest_and_moves() {
    let chain = ChainModel::new(4).unwrap();
    let state = chain.initial_hanging_state(1.0, 0.5);
    assert!(state.rows(4, 4).iter().all(|&w| w == 0.0));

    let mut integrator = AdaptiveIntegrator::new(chain, state.clone(), TableauVariant::Fehlberg45);
    for _ in 0..10 {
        integrator.step(0.01, true).unwrap();
    }
    assert_eq!(integrator.iteration_count(), 10);
    assert_ne!(integrator.state(), &state);
    assert!(integrator.state().iter().all(|v| v.is_finite()));
}
