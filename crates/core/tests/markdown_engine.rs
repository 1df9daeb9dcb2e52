use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use shelfmark_core::{
    price_products, price_records, resolve_sales_rate, PricingConfig, PricingParameters, Product,
    ProductId, ProductRecord, RateSource, SalesRateTable,
};

fn run_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 10, 9, 30, 0).unwrap()
}

fn product(id: i64, price: Decimal, expires_in: Duration, on_shelf_for: Duration) -> Product {
    let now = run_instant();
    Product {
        id: ProductId::from(id),
        original_price: price,
        expiry_date: now + expires_in,
        date_added: now - on_shelf_for,
        category: "Snacks".to_string(),
    }
}

fn snacks_only() -> SalesRateTable {
    SalesRateTable::new(Vec::new(), [("Snacks".to_string(), Decimal::new(40, 1))])
        .expect("valid rates")
}

#[test]
fn snacks_scenario_prices_from_category_fallback() {
    let products = vec![product(1, Decimal::from(100), Duration::days(29), Duration::days(1))];

    let results =
        price_products(&products, &snacks_only(), &PricingConfig::default(), run_instant());
    let result = results[0].as_ref().expect("priced");

    assert_eq!(result.days_to_expiry, 29);
    assert_eq!(result.shelf_time_days, 1);
    assert_eq!(result.resolved_sales_rate, Decimal::new(40, 1));
    assert_eq!(result.rate_source, RateSource::Category);
    assert_eq!(result.factors.demand, Decimal::new(6, 1));
    assert_eq!(result.discount.round_dp(4), Decimal::new(2033, 4));
    assert_eq!(result.new_price.round_dp(2), Decimal::new(7967, 2));
    assert!(!result.floor_applied);
    assert!(result.new_price > Decimal::from(50));
}

#[test]
fn expired_product_without_demand_lands_exactly_on_the_floor() {
    let products = vec![product(2, Decimal::from(100), Duration::days(-5), Duration::days(10))];

    let results = price_products(
        &products,
        &SalesRateTable::default(),
        &PricingConfig::default(),
        run_instant(),
    );
    let result = results[0].as_ref().expect("priced");

    assert_eq!(result.days_to_expiry, -5);
    assert_eq!(result.resolved_sales_rate, Decimal::ZERO);
    assert_eq!(result.rate_source, RateSource::None);
    assert_eq!(result.factors.demand, Decimal::ONE);
    assert!(result.factors.expiry > Decimal::ONE, "expired stock amplifies the expiry factor");
    assert!(result.floor_applied);
    assert_eq!(result.new_price, Decimal::from(50));
}

#[test]
fn zero_weights_leave_the_price_untouched() {
    let config = PricingConfig::new(PricingParameters {
        alpha: Decimal::ZERO,
        beta: Decimal::ZERO,
        gamma: Decimal::ZERO,
        ..PricingParameters::default()
    })
    .expect("valid config");
    let products = vec![
        product(1, Decimal::new(19_999, 2), Duration::days(-40), Duration::days(90)),
        product(2, Decimal::from(5), Duration::hours(3), Duration::days(-2)),
    ];

    for result in price_products(&products, &snacks_only(), &config, run_instant()) {
        let result = result.expect("priced");
        assert_eq!(result.discount, Decimal::ZERO);
        assert_eq!(result.new_price, result.original_price);
    }
}

#[test]
fn floor_holds_across_extreme_inputs() {
    let weights = [Decimal::new(-15, 1), Decimal::ZERO, Decimal::new(4, 1), Decimal::from(3)];
    let ratios = [Decimal::ZERO, Decimal::new(25, 2), Decimal::ONE];
    let spans = [-400, -5, 0, 1, 29, 365];
    let prices = [Decimal::ZERO, Decimal::new(99, 2), Decimal::from(1_250)];
    let rates = SalesRateTable::new(
        [(ProductId::from(1), Decimal::from(25))],
        [("Snacks".to_string(), Decimal::ZERO)],
    )
    .expect("valid rates");

    let mut products = Vec::new();
    for (index, (&expiry, &shelf)) in spans.iter().zip(spans.iter().rev()).enumerate() {
        for &price in &prices {
            products.push(product(
                index as i64 % 2,
                price,
                Duration::days(expiry),
                Duration::days(shelf),
            ));
        }
    }

    for &weight in &weights {
        for &ratio in &ratios {
            let config = PricingConfig::new(PricingParameters {
                alpha: weight,
                beta: -weight,
                gamma: weight,
                min_price_ratio: ratio,
                ..PricingParameters::default()
            })
            .expect("valid config");

            for result in price_products(&products, &rates, &config, run_instant()) {
                let result = result.expect("priced");
                assert!(
                    result.new_price >= result.original_price * ratio,
                    "floor violated for {result:?}"
                );
                assert!(result.resolved_sales_rate >= Decimal::ZERO);
            }
        }
    }
}

#[test]
fn repeated_runs_with_the_same_instant_are_identical() {
    let records: Vec<ProductRecord> = vec![
        product(1, Decimal::from(200), Duration::hours(200), Duration::hours(30)).into(),
        product(2, Decimal::from(150), Duration::hours(-7), Duration::days(12)).into(),
        product(3, Decimal::new(4_575, 2), Duration::days(3), Duration::minutes(5)).into(),
    ];
    let rates = SalesRateTable::builtin();
    let config = PricingConfig::default();

    let first = price_records(records.clone(), &rates, &config, run_instant());
    let second = price_records(records, &rates, &config, run_instant());

    assert_eq!(first, second);
    let first_json = serde_json::to_string(&first.priced().collect::<Vec<_>>()).expect("json");
    let second_json = serde_json::to_string(&second.priced().collect::<Vec<_>>()).expect("json");
    assert_eq!(first_json, second_json);
}

#[test]
fn one_result_per_input_in_input_order() {
    let products: Vec<Product> = (10..20)
        .rev()
        .map(|id| product(id, Decimal::from(id), Duration::days(id), Duration::days(1)))
        .collect();

    let results = price_products(
        &products,
        &SalesRateTable::builtin(),
        &PricingConfig::default(),
        run_instant(),
    );

    assert_eq!(results.len(), products.len());
    for (product, result) in products.iter().zip(&results) {
        assert_eq!(&result.as_ref().expect("priced").product_id, &product.id);
    }
}

#[test]
fn resolver_policy_matches_the_fallback_chain() {
    let table = SalesRateTable::new(
        [(ProductId::from(1), Decimal::new(52, 1)), (ProductId::from(2), Decimal::ZERO)],
        [("Snacks".to_string(), Decimal::new(40, 1)), ("Bakery".to_string(), Decimal::ZERO)],
    )
    .expect("valid rates");

    let direct = resolve_sales_rate(&ProductId::from(1), "Bakery", &table);
    assert_eq!((direct.rate, direct.source), (Decimal::new(52, 1), RateSource::Product));

    let zero_falls_through = resolve_sales_rate(&ProductId::from(2), "Snacks", &table);
    assert_eq!(
        (zero_falls_through.rate, zero_falls_through.source),
        (Decimal::new(40, 1), RateSource::Category)
    );

    let zero_category = resolve_sales_rate(&ProductId::from(3), "Bakery", &table);
    assert_eq!((zero_category.rate, zero_category.source), (Decimal::ZERO, RateSource::Category));

    let unknown = resolve_sales_rate(&ProductId::from(3), "Dairy", &table);
    assert_eq!((unknown.rate, unknown.source), (Decimal::ZERO, RateSource::None));
}

#[test]
fn future_shelf_entry_reduces_the_discount() {
    let config = PricingConfig::default();
    let rates = snacks_only();
    let past = product(1, Decimal::from(100), Duration::days(10), Duration::days(3));
    let future = product(1, Decimal::from(100), Duration::days(10), Duration::days(-3));

    let results = price_products(&[past, future], &rates, &config, run_instant());
    let past = results[0].as_ref().expect("priced");
    let future = results[1].as_ref().expect("priced");

    assert_eq!(future.shelf_time_days, -3);
    assert!(future.factors.shelf_time < Decimal::ZERO);
    assert!(future.discount < past.discount);
    assert!(future.new_price > past.new_price);
}
