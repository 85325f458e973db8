//! Variance-covariance VaR / ES reference tests.
//!
//! Reference values computed from the closed-form normal loss model with the sample
//! mean and unbiased sample covariance of each panel:
//!
//! port_mu = w'mu, port_sigma = sqrt(w'Sigma w)
//! VaR_alpha = -port_mu + port_sigma * Phi^{-1}(alpha)
//! ES_alpha  = -port_mu + port_sigma * phi(Phi^{-1}(alpha)) / (1 - alpha)

use approx::{assert_abs_diff_eq, assert_relative_eq};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};
use varferric::core::{ConfidenceLevel, ReturnMatrix, RiskError, WeightVector};
use varferric::math::normal_inv_cdf;
use varferric::risk::{VarCovEstimator, normal_loss_var_es, varcov_var_es};

// ============================================================================
// Fixed panels
// ============================================================================

fn single_asset_panel() -> ReturnMatrix {
    ReturnMatrix::from_columns(&[vec![0.01, -0.02, 0.015, -0.005, 0.02]]).unwrap()
}

fn three_asset_panel() -> ReturnMatrix {
    ReturnMatrix::from_rows(&[
        vec![0.01, 0.02, -0.01],
        vec![-0.02, 0.01, 0.005],
        vec![0.015, -0.01, 0.0],
        vec![-0.005, 0.0, 0.01],
        vec![0.02, 0.015, -0.02],
        vec![0.0, -0.005, 0.012],
    ])
    .unwrap()
}

fn random_panel(seed: u64, n_obs: usize, n_assets: usize) -> ReturnMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows = (0..n_obs)
        .map(|_| {
            (0..n_assets)
                .map(|_| {
                    let z: f64 = StandardNormal.sample(&mut rng);
                    0.0005 + 0.015 * z
                })
                .collect()
        })
        .collect::<Vec<Vec<f64>>>();
    ReturnMatrix::from_rows(&rows).unwrap()
}

struct FixtureCase {
    weights: Vec<f64>,
    alpha: f64,
    expected_var: f64,
    expected_es: f64,
}

fn single_asset_cases() -> Vec<FixtureCase> {
    vec![
        FixtureCase {
            weights: vec![100.0],
            alpha: 0.99,
            expected_var: 3.4048413374371287,
            expected_es: 3.9590717243344495,
        },
        FixtureCase {
            weights: vec![100.0],
            alpha: 0.95,
            expected_var: 2.290228380585043,
            expected_es: 2.9736549227407063,
        },
        FixtureCase {
            weights: vec![100.0],
            alpha: 0.5,
            expected_var: -0.4,
            expected_es: 0.9049742875180645,
        },
    ]
}

fn three_asset_cases() -> Vec<FixtureCase> {
    vec![
        FixtureCase {
            weights: vec![90.0, 70.0, 50.0],
            alpha: 0.99,
            expected_var: 1.8212629186451594,
            expected_es: 2.177596632356994,
        },
        FixtureCase {
            weights: vec![90.0, 70.0, 50.0],
            alpha: 0.95,
            expected_var: 1.1046400418485924,
            expected_es: 1.5440383923772907,
        },
    ]
}

#[test]
fn single_asset_matches_reference() {
    let returns = single_asset_panel();
    for case in single_asset_cases() {
        let w = WeightVector::new(case.weights).unwrap();
        let r = varcov_var_es(&returns, &w, case.alpha).unwrap();
        assert_relative_eq!(r.var, case.expected_var, epsilon = 1e-8);
        assert_relative_eq!(r.es, case.expected_es, epsilon = 1e-8);
    }
}

#[test]
fn three_asset_matches_reference() {
    let returns = three_asset_panel();
    for case in three_asset_cases() {
        let w = WeightVector::new(case.weights).unwrap();
        let r = varcov_var_es(&returns, &w, case.alpha).unwrap();
        assert_relative_eq!(r.var, case.expected_var, epsilon = 1e-8);
        assert_relative_eq!(r.es, case.expected_es, epsilon = 1e-8);
    }
}

#[test]
fn three_asset_portfolio_sigma_matches_reference() {
    let model = VarCovEstimator::default()
        .fit_model(&three_asset_panel())
        .unwrap();
    let w = WeightVector::new(vec![90.0, 70.0, 50.0]).unwrap();
    assert_relative_eq!(
        model.portfolio_std_dev(&w).unwrap(),
        1.0515464801900103,
        epsilon = 1e-12
    );
    assert_relative_eq!(
        model.portfolio_mean(&w).unwrap(),
        90.0 * 0.02 / 6.0 + 70.0 * 0.005 - 50.0 * 0.0005,
        epsilon = 1e-12
    );
}

// ============================================================================
// Standard normal loss: VaR = Phi^{-1}(alpha), ES = phi(z) / (1 - alpha)
// ============================================================================

#[test]
fn standard_normal_loss_matches_analytical() {
    let cases = [
        (0.90, 1.2815515655446, 1.7549833193249),
        (0.95, 1.6448536269515, 2.0627128075074),
        (0.975, 1.9599639845401, 2.3378027922014),
        (0.99, 2.3263478740408, 2.6652142203458),
        (0.999, 3.0902323061678, 3.3670900770640),
    ];
    for (alpha, var, es) in cases {
        let r = normal_loss_var_es(0.0, 1.0, ConfidenceLevel::new(alpha).unwrap());
        assert_relative_eq!(r.var, var, epsilon = 1e-9);
        assert_relative_eq!(r.es, es, epsilon = 1e-9);
    }
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn es_is_at_least_var_above_median_confidence() {
    let alphas = [0.5, 0.6, 0.75, 0.9, 0.95, 0.975, 0.99, 0.995, 0.999];
    for seed in 0..10 {
        let returns = random_panel(seed, 120, 4);
        let w = WeightVector::new(vec![100.0, -40.0, 25.0, 60.0]).unwrap();
        for &alpha in &alphas {
            let r = varcov_var_es(&returns, &w, alpha).unwrap();
            assert!(
                r.es >= r.var,
                "ES ({}) should be >= VaR ({}) at alpha={alpha}, seed={seed}",
                r.es,
                r.var
            );
        }
    }
}

#[test]
fn var_and_es_increase_strictly_with_confidence() {
    let returns = random_panel(7, 250, 3);
    let w = WeightVector::new(vec![90.0, 70.0, 50.0]).unwrap();
    let model = VarCovEstimator::default().fit_model(&returns).unwrap();

    let alphas = [0.5, 0.8, 0.9, 0.95, 0.975, 0.99, 0.999];
    let results = alphas
        .iter()
        .map(|&a| model.risk(&w, ConfidenceLevel::new(a).unwrap()).unwrap())
        .collect::<Vec<_>>();
    for pair in results.windows(2) {
        assert!(pair[1].var > pair[0].var);
        assert!(pair[1].es > pair[0].es);
    }
}

#[test]
fn scaling_weights_scales_both_measures() {
    let returns = random_panel(11, 200, 3);
    let w = WeightVector::new(vec![90.0, 70.0, 50.0]).unwrap();
    let base = varcov_var_es(&returns, &w, 0.99).unwrap();

    for k in [0.25, 2.0, 10.0, 1_000.0] {
        let scaled = varcov_var_es(&returns, &w.scaled(k), 0.99).unwrap();
        assert_relative_eq!(scaled.var, k * base.var, max_relative = 1e-12);
        assert_relative_eq!(scaled.es, k * base.es, max_relative = 1e-12);
    }
}

#[test]
fn constant_columns_give_negative_expected_return() {
    let returns = ReturnMatrix::from_rows(&[
        vec![0.5, -0.25, 0.125],
        vec![0.5, -0.25, 0.125],
        vec![0.5, -0.25, 0.125],
        vec![0.5, -0.25, 0.125],
    ])
    .unwrap();
    let w = WeightVector::new(vec![10.0, 20.0, 40.0]).unwrap();
    let fit = VarCovEstimator::default().fit(&returns, &w, 0.99).unwrap();

    assert!(fit.model.covariance().iter().all(|&c| c == 0.0));
    let expected = -(10.0 * 0.5 - 20.0 * 0.25 + 40.0 * 0.125);
    assert_eq!(fit.risk.var, expected);
    assert_eq!(fit.risk.es, expected);
}

#[test]
fn covariance_equals_its_transpose() {
    for seed in 0..5 {
        let model = VarCovEstimator::default()
            .fit_model(&random_panel(seed, 60, 6))
            .unwrap();
        let cov = model.covariance();
        assert_eq!(cov, &cov.transpose());
    }
}

#[test]
fn median_confidence_var_is_negative_expected_return() {
    assert_abs_diff_eq!(normal_inv_cdf(0.5), 0.0, epsilon = 1e-15);
    let returns = three_asset_panel();
    let w = WeightVector::new(vec![90.0, 70.0, 50.0]).unwrap();
    let fit = VarCovEstimator::default().fit(&returns, &w, 0.5).unwrap();
    let port_mu = fit.model.portfolio_mean(&w).unwrap();

    assert_relative_eq!(fit.risk.var, -port_mu, epsilon = 1e-15);
    assert!(fit.risk.es.is_finite());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn two_weights_against_three_assets_is_shape_mismatch() {
    let w = WeightVector::new(vec![90.0, 70.0]).unwrap();
    assert_eq!(
        varcov_var_es(&three_asset_panel(), &w, 0.99),
        Err(RiskError::ShapeMismatch {
            expected: 3,
            actual: 2
        })
    );
}

#[test]
fn shape_mismatch_wins_over_rank_deficiency() {
    let returns = ReturnMatrix::from_rows(&[vec![0.1, 0.2, 0.3], vec![0.0, 0.1, 0.2]]).unwrap();
    let w = WeightVector::new(vec![1.0]).unwrap();
    assert!(matches!(
        varcov_var_es(&returns, &w, 0.99),
        Err(RiskError::ShapeMismatch { .. })
    ));
}

#[test]
fn fewer_than_two_observations_is_insufficient_data() {
    assert_eq!(
        ReturnMatrix::from_rows(&[vec![0.01, 0.02]]),
        Err(RiskError::InsufficientData { observations: 1 })
    );
}

#[test]
fn confidence_of_one_is_rejected() {
    let w = WeightVector::new(vec![100.0]).unwrap();
    assert_eq!(
        varcov_var_es(&single_asset_panel(), &w, 1.0),
        Err(RiskError::InvalidConfidence(1.0))
    );
}

// ============================================================================
// Reentrancy
// ============================================================================

#[test]
fn concurrent_fits_match_sequential_fits() {
    let estimator = VarCovEstimator::default();
    let panels = (0..8).map(|s| random_panel(s, 100, 3)).collect::<Vec<_>>();
    let w = WeightVector::new(vec![90.0, 70.0, 50.0]).unwrap();

    let sequential = panels
        .iter()
        .map(|p| estimator.fit(p, &w, 0.99).unwrap().risk)
        .collect::<Vec<_>>();

    let (estimator, w) = (&estimator, &w);
    let concurrent = std::thread::scope(|s| {
        let handles = panels
            .iter()
            .map(|p| s.spawn(move || estimator.fit(p, w, 0.99).unwrap().risk))
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert_eq!(sequential, concurrent);
}
