//! Billing Terms
//!
//! A term is one billing option for a product: how many periods it covers, the
//! current per-period price, the list price it is compared against and an
//! optional introductory (trial) price for the first period.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to term construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TermError {
    /// A term must cover at least one billing period.
    #[error("term period must be at least 1")]
    ZeroPeriod,
}

/// A billing term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    period: u32,
    price: Decimal,
    old: Decimal,
    trial: Option<Decimal>,
}

impl Term {
    /// Create a new term covering `period` billing periods, with zero prices and no trial.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::ZeroPeriod`] if `period` is zero.
    pub fn new(period: u32) -> Result<Self, TermError> {
        if period == 0 {
            return Err(TermError::ZeroPeriod);
        }

        Ok(Self {
            period,
            price: Decimal::ZERO,
            old: Decimal::ZERO,
            trial: None,
        })
    }

    /// Set the current per-period price.
    #[must_use]
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }

    /// Set the list price the current price is compared against.
    #[must_use]
    pub fn with_old(mut self, old: Decimal) -> Self {
        self.old = old;
        self
    }

    /// Set the trial price charged for the first period.
    #[must_use]
    pub fn with_trial(mut self, trial: Decimal) -> Self {
        self.trial = Some(trial);
        self
    }

    /// Copy of the term with every amount at its smallest scale (`10.00` becomes `10`).
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            period: self.period,
            price: self.price.normalize(),
            old: self.old.normalize(),
            trial: self.trial.map(|trial| trial.normalize()),
        }
    }

    /// Number of billing periods covered by the term
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Current per-period price
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// List price
    pub fn old(&self) -> Decimal {
        self.old
    }

    /// Trial price, if one was configured
    pub fn trial(&self) -> Option<Decimal> {
        self.trial
    }

    /// Whether the first period is charged at a distinct, non-negative trial price.
    pub fn has_trial(&self) -> bool {
        self.trial
            .is_some_and(|trial| trial >= Decimal::ZERO && trial != self.price)
    }

    /// Price of the whole term, with the first period at the trial price when there is one.
    pub fn total_price(&self) -> Decimal {
        let periods = Decimal::from(self.period);

        match self.trial {
            Some(trial) if self.has_trial() => (periods - Decimal::ONE) * self.price + trial,
            _ => self.price * periods,
        }
    }

    /// Amount saved over the term.
    ///
    /// With a trial this is the first-period saving; otherwise it is the per-period
    /// difference to the list price across the whole term.
    pub fn save(&self) -> Decimal {
        match self.trial {
            Some(trial) if self.has_trial() => self.price - trial,
            _ if self.old > self.price => (self.old - self.price) * Decimal::from(self.period),
            _ => Decimal::ZERO,
        }
    }

    /// Saving as a fraction of the undiscounted price (e.g. `0.2` for 20%).
    pub fn save_percent(&self) -> Percentage {
        let fraction = if self.has_trial() {
            let full = self.price * Decimal::from(self.period);

            self.total_price()
                .checked_div(full)
                .map_or(Decimal::ZERO, |ratio| Decimal::ONE - ratio)
        } else if self.save() == Decimal::ZERO {
            Decimal::ZERO
        } else {
            (self.old - self.price)
                .checked_div(self.price)
                .unwrap_or(Decimal::ZERO)
        };

        Percentage::from(fraction)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn new_rejects_zero_period() {
        assert_eq!(Term::new(0), Err(TermError::ZeroPeriod));
    }

    #[test]
    fn new_term_has_no_trial_and_zero_prices() -> TestResult {
        let term = Term::new(12)?;

        assert_eq!(term.period(), 12);
        assert_eq!(term.price(), Decimal::ZERO);
        assert_eq!(term.old(), Decimal::ZERO);
        assert_eq!(term.trial(), None);
        assert!(!term.has_trial());

        Ok(())
    }

    #[test]
    fn total_price_multiplies_price_by_period() -> TestResult {
        let term = Term::new(6)?.with_price(Decimal::new(1299, 2));

        assert_eq!(term.total_price(), Decimal::new(7794, 2));

        Ok(())
    }

    #[test]
    fn trial_equal_to_price_is_not_a_trial() -> TestResult {
        let term = Term::new(3)?
            .with_price(Decimal::from(10))
            .with_trial(Decimal::from(10));

        assert!(!term.has_trial());
        assert_eq!(term.total_price(), Decimal::from(30));

        Ok(())
    }

    #[test]
    fn negative_trial_is_not_a_trial() -> TestResult {
        let term = Term::new(3)?
            .with_price(Decimal::from(10))
            .with_trial(Decimal::from(-1));

        assert!(!term.has_trial());

        Ok(())
    }

    #[test]
    fn total_price_charges_trial_for_first_period() -> TestResult {
        let term = Term::new(12)?
            .with_price(Decimal::from(10))
            .with_trial(Decimal::ONE);

        assert!(term.has_trial());
        assert_eq!(term.total_price(), Decimal::from(111));

        Ok(())
    }

    #[test]
    fn save_uses_old_price_across_the_term() -> TestResult {
        let term = Term::new(2)?
            .with_price(Decimal::from(10))
            .with_old(Decimal::from(12));

        assert_eq!(term.save(), Decimal::from(4));
        assert_eq!(term.save_percent(), Percentage::from(Decimal::new(2, 1)));

        Ok(())
    }

    #[test]
    fn save_is_zero_when_old_price_is_lower() -> TestResult {
        let term = Term::new(1)?
            .with_price(Decimal::from(12))
            .with_old(Decimal::from(10));

        assert_eq!(term.save(), Decimal::ZERO);
        assert_eq!(term.save_percent(), Percentage::from(Decimal::ZERO));

        Ok(())
    }

    #[test]
    fn save_with_trial_is_first_period_difference() -> TestResult {
        let term = Term::new(4)?
            .with_price(Decimal::from(10))
            .with_old(Decimal::from(20))
            .with_trial(Decimal::from(2));

        assert_eq!(term.save(), Decimal::from(8));
        // total 32 of a full 40
        assert_eq!(term.save_percent(), Percentage::from(Decimal::new(2, 1)));

        Ok(())
    }

    #[test]
    fn save_percent_with_free_price_is_zero() -> TestResult {
        let term = Term::new(1)?
            .with_price(Decimal::ZERO)
            .with_old(Decimal::from(5));

        assert_eq!(term.save(), Decimal::from(5));
        assert_eq!(term.save_percent(), Percentage::from(Decimal::ZERO));

        Ok(())
    }
}
