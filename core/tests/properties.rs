//! Seeded sweeps over random valid requests.
//!
//! Every case is reproducible from its seed; a failure message carries
//! the full request.

use agentplan_core::{erlang, optimize, OptimizationRequest};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

const CASES: usize = 60;

fn random_request(rng: &mut Pcg64Mcg) -> OptimizationRequest {
    let volume = rng.gen_range(1.0..2000.0);
    let aht = rng.gen_range(30.0..600.0);
    let interval = if rng.gen_bool(0.5) { 1800.0 } else { 3600.0 };
    let occupancy = rng.gen_range(0.6..=1.0);
    let shrinkage = rng.gen_range(0.0..0.5);

    let req = if rng.gen_bool(0.5) {
        OptimizationRequest::asa(volume, aht, interval, rng.gen_range(5.0..60.0))
    } else {
        OptimizationRequest::sla(
            volume,
            aht,
            interval,
            rng.gen_range(0.5..0.99),
            rng.gen_range(10.0..60.0),
        )
    };
    req.with_max_occupancy(occupancy).with_shrinkage(shrinkage)
}

#[test]
fn results_are_stable_capped_and_shrunk() {
    let mut rng = Pcg64Mcg::seed_from_u64(0xA11C_E5ED);

    for _ in 0..CASES {
        let req = random_request(&mut rng);
        let result = optimize(&req).unwrap();
        let intensity = req.traffic_intensity();

        assert!(result.agent_req as f64 > intensity, "unstable: {req:?} -> {result:?}");
        assert!(result.agent_req_shrink >= result.agent_req, "{req:?} -> {result:?}");
        assert!(
            intensity / result.agent_req as f64 <= req.max_occupancy + 1e-9,
            "occupancy cap violated: {req:?} -> {result:?}"
        );
        assert!(
            (0.0..=1.0).contains(&result.prob_waiting),
            "probability out of range: {req:?} -> {result:?}"
        );
    }
}

#[test]
fn waiting_probability_stays_in_unit_interval() {
    let mut rng = Pcg64Mcg::seed_from_u64(42);

    for _ in 0..CASES {
        let intensity: f64 = rng.gen_range(0.0..400.0);
        let agents = intensity.floor() as u64 + rng.gen_range(0..40);
        let p = erlang::waiting_probability(intensity, agents);
        assert!(
            (0.0..=1.0).contains(&p.value),
            "a={intensity} n={agents}: p={}",
            p.value
        );
    }
}

#[test]
fn looser_asa_target_never_needs_more_agents() {
    let mut rng = Pcg64Mcg::seed_from_u64(7);

    for _ in 0..CASES / 3 {
        let volume = rng.gen_range(10.0..2000.0);
        let aht = rng.gen_range(60.0..600.0);

        let mut previous = u64::MAX;
        for asa in [2.0, 5.0, 10.0, 20.0, 40.0, 80.0, 160.0] {
            let req = OptimizationRequest::asa(volume, aht, 3600.0, asa).with_max_occupancy(0.9);
            let agents = optimize(&req).unwrap().agent_req;
            assert!(agents <= previous, "asa={asa} needed {agents} > {previous}: {req:?}");
            previous = agents;
        }
    }
}

#[test]
fn lower_sla_target_never_needs_more_agents() {
    let mut rng = Pcg64Mcg::seed_from_u64(99);

    for _ in 0..CASES / 3 {
        let volume = rng.gen_range(10.0..2000.0);
        let aht = rng.gen_range(60.0..600.0);
        let service_time = rng.gen_range(10.0..60.0);

        let mut previous = u64::MAX;
        for sla in [0.99, 0.95, 0.9, 0.8, 0.7, 0.5, 0.2] {
            let req = OptimizationRequest::sla(volume, aht, 3600.0, sla, service_time);
            let agents = optimize(&req).unwrap().agent_req;
            assert!(agents <= previous, "sla={sla} needed {agents} > {previous}: {req:?}");
            previous = agents;
        }
    }
}
