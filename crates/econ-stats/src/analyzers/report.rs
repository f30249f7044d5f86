//! Extended OLS summary with inference statistics

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};
use std::f64::consts::PI;

use crate::analyzers::regression::{OlsFit, RegressionDiagnostics};
use crate::panel::EntityKey;
use crate::statistic::{Statistic, Undefined};

const CONFIDENCE: f64 = 0.95;

/// One row of the coefficient table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_err: Statistic,
    pub t_value: Statistic,
    pub p_value: Statistic,
    pub ci_lower: Statistic,
    pub ci_upper: Statistic,
}

/// Full statistical summary of one entity's fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    pub entity: EntityKey,
    pub n_obs: usize,
    pub df_model: usize,
    pub df_resid: usize,
    pub coefficients: Vec<Coefficient>,
    pub r_squared: Statistic,
    pub adj_r_squared: Statistic,
    pub f_statistic: Statistic,
    pub f_p_value: Statistic,
    pub log_likelihood: Statistic,
    pub aic: Statistic,
    pub bic: Statistic,
    pub mse: f64,
}

impl RegressionReport {
    pub fn from_fit(entity: EntityKey, fit: &OlsFit) -> Self {
        let n = fit.n as f64;
        let df_model = 1;
        let df_resid = fit.n.saturating_sub(2);
        let dfr = df_resid as f64;

        let sigma2 = if df_resid == 0 {
            Statistic::Undefined(Undefined::InsufficientObservations)
        } else {
            Statistic::from_f64(fit.ss_res / dfr)
        };

        let t_dist = (df_resid > 0)
            .then(|| StudentsT::new(0.0, 1.0, dfr).ok())
            .flatten();
        let t_crit = t_dist
            .as_ref()
            .map(|t| t.inverse_cdf(0.5 + CONFIDENCE / 2.0));

        let coefficient = |name: &str, estimate: f64, variance_factor: f64| {
            let std_err = sigma2.map(|s2| (s2 * variance_factor).sqrt());
            let t_value = match std_err {
                Statistic::Value(se) => Statistic::checked(estimate / se, Undefined::DivisionByZero),
                undefined => undefined,
            };
            let p_value = match (t_value, &t_dist) {
                (Statistic::Value(t), Some(dist)) => Statistic::from_f64(2.0 * dist.sf(t.abs())),
                (Statistic::Value(_), None) => {
                    Statistic::Undefined(Undefined::InsufficientObservations)
                }
                (undefined, _) => undefined,
            };
            let (ci_lower, ci_upper) = match (std_err, t_crit) {
                (Statistic::Value(se), Some(q)) => (
                    Statistic::from_f64(estimate - q * se),
                    Statistic::from_f64(estimate + q * se),
                ),
                (Statistic::Value(_), None) => {
                    let u = Statistic::Undefined(Undefined::InsufficientObservations);
                    (u, u)
                }
                (undefined, _) => (undefined, undefined),
            };
            Coefficient {
                name: name.to_string(),
                estimate,
                std_err,
                t_value,
                p_value,
                ci_lower,
                ci_upper,
            }
        };

        let coefficients = vec![
            coefficient("const", fit.intercept, 1.0 / n + fit.x_mean * fit.x_mean / fit.sxx),
            coefficient("x1", fit.slope, 1.0 / fit.sxx),
        ];

        let r_squared = fit.r_squared();
        let adj_r_squared = if df_resid == 0 {
            Statistic::Undefined(Undefined::InsufficientObservations)
        } else {
            r_squared.map(|r2| 1.0 - (1.0 - r2) * (n - 1.0) / dfr)
        };

        let f_statistic = match sigma2 {
            Statistic::Value(s2) => {
                let explained = fit.ss_tot - fit.ss_res;
                Statistic::checked(explained / s2, Undefined::DivisionByZero)
            }
            undefined => undefined,
        };
        let f_p_value = match f_statistic {
            Statistic::Value(f) => FisherSnedecor::new(df_model as f64, dfr)
                .map(|dist| Statistic::from_f64(dist.sf(f)))
                .unwrap_or(Statistic::Undefined(Undefined::InsufficientObservations)),
            undefined => undefined,
        };

        let log_likelihood = if fit.ss_res == 0.0 {
            Statistic::Undefined(Undefined::DivisionByZero)
        } else {
            Statistic::from_f64(-n / 2.0 * ((2.0 * PI).ln() + (fit.ss_res / n).ln() + 1.0))
        };
        let k = (df_model + 1) as f64;
        let aic = log_likelihood.map(|llf| -2.0 * llf + 2.0 * k);
        let bic = log_likelihood.map(|llf| -2.0 * llf + k * n.ln());

        Self {
            entity,
            n_obs: fit.n,
            df_model,
            df_resid,
            coefficients,
            r_squared,
            adj_r_squared,
            f_statistic,
            f_p_value,
            log_likelihood,
            aic,
            bic,
            mse: fit.mse(),
        }
    }

    pub fn intercept(&self) -> &Coefficient {
        &self.coefficients[0]
    }

    pub fn slope(&self) -> &Coefficient {
        &self.coefficients[1]
    }

    pub fn diagnostics(&self) -> RegressionDiagnostics {
        RegressionDiagnostics {
            slope: self.slope().estimate,
            intercept: self.intercept().estimate,
            r_squared: self.r_squared,
            mse: self.mse,
            n_obs: self.n_obs,
        }
    }
}
