#[cfg(test)]
mod tests {
    use crate::models::*;
    use serde_json::json;

    #[test]
    fn test_order_deserializes_numeric_id_and_known_status() {
        let order: SalesOrder = serde_json::from_value(json!({
            "id": 42,
            "order_status": "Waiting Deployment",
            "app_name": "my-geonode",
            "package": {"id": 3, "name": "Small", "price": "100.00", "currency": "USD"},
            "invoice_url": null
        }))
        .unwrap();

        assert_eq!(order.id, OrderId::from(42));
        assert_eq!(order.order_status, OrderStatus::WaitingDeployment);
        assert!(order.has_app_name());
        assert_eq!(order.package.unwrap().price.as_deref(), Some("100.00"));
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let order: SalesOrder = serde_json::from_value(json!({
            "id": "abc",
            "order_status": "Cancelled",
            "app_name": null,
            "product": 7
        }))
        .unwrap();

        assert_eq!(order.order_status, OrderStatus::Unknown("Cancelled".into()));
        assert!(!order.order_status.is_known());
        assert!(!order.has_app_name());
        assert!(order.product.is_none());
        assert_eq!(serde_json::to_value(&order.order_status).unwrap(), json!("Cancelled"));
    }

    #[test]
    fn test_agreement_list_accepts_both_shapes() {
        let plain: AgreementList =
            serde_json::from_value(json!([{"id": 1, "name": "Terms", "template": "t"}])).unwrap();
        let paged: AgreementList = serde_json::from_value(
            json!({"count": 1, "results": [{"id": 1, "name": "Terms", "template": "t"}]}),
        )
        .unwrap();

        assert_eq!(Vec::<Agreement>::from(plain), Vec::<Agreement>::from(paged));
    }
}
