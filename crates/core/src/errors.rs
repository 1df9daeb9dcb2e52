use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::product::ProductId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("invalid pricing configuration: `{field}` {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },
    #[error("sales rate for `{key}` must be non-negative, got {rate}")]
    NegativeSalesRate { key: String, rate: Decimal },
    #[error("product `{product_id}` has malformed `{field}`: `{value}`")]
    MalformedInput { product_id: ProductId, field: &'static str, value: String },
    #[error("pricing product `{product_id}` exceeded the decimal range")]
    ArithmeticOverflow { product_id: ProductId },
}

impl PricingError {
    /// Batch-level errors abort a run; the rest only fail the affected product.
    pub fn is_fatal_to_batch(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. } | Self::NegativeSalesRate { .. })
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration { .. } => "invalid_configuration",
            Self::NegativeSalesRate { .. } => "invalid_sales_rate",
            Self::MalformedInput { .. } => "malformed_input",
            Self::ArithmeticOverflow { .. } => "arithmetic_overflow",
        }
    }

    pub fn product_id(&self) -> Option<&ProductId> {
        match self {
            Self::MalformedInput { product_id, .. }
            | Self::ArithmeticOverflow { product_id } => Some(product_id),
            Self::InvalidConfiguration { .. } | Self::NegativeSalesRate { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::product::ProductId;
    use crate::errors::PricingError;

    #[test]
    fn configuration_and_rate_errors_abort_the_batch() {
        let invalid = PricingError::InvalidConfiguration {
            field: "max_shelf_life",
            reason: "must be greater than zero".to_owned(),
        };
        let negative = PricingError::NegativeSalesRate {
            key: "Snacks".to_owned(),
            rate: Decimal::NEGATIVE_ONE,
        };

        assert!(invalid.is_fatal_to_batch());
        assert!(negative.is_fatal_to_batch());
        assert_eq!(invalid.product_id(), None);
    }

    #[test]
    fn per_item_errors_carry_the_product_id() {
        let malformed = PricingError::MalformedInput {
            product_id: ProductId::from(3),
            field: "dateAdded",
            value: "yesterday".to_owned(),
        };

        assert!(!malformed.is_fatal_to_batch());
        assert_eq!(malformed.product_id(), Some(&ProductId::from(3)));
        assert_eq!(malformed.error_class(), "malformed_input");
        assert_eq!(
            malformed.to_string(),
            "product `3` has malformed `dateAdded`: `yesterday`"
        );
    }
}
