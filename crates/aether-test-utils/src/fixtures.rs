//! Response bodies shaped like the analysis service's answers

use serde_json::{json, Value};

pub fn created(id: &str) -> Value {
    json!({ "id": id })
}

pub fn inventory() -> Value {
    json!({
        "inventory": { "id": 1, "dataset_name": "crm", "source": "CRM Export", "sensitivity": "Restricted" },
        "risk_assessment": [
            "High Risk: Strict Access Control Required",
            "Encryption at Rest Mandatory"
        ]
    })
}

pub fn upload(dataset_id: &str) -> Value {
    json!({
        "info": "file 'churn.csv' saved",
        "dataset_id": dataset_id,
        "warnings": [{ "type": "Email", "column": "contact_email" }]
    })
}

pub fn clean_ok(operation: &str) -> Value {
    json!({
        "status": "success",
        "message": format!("Operation '{operation}' applied successfully")
    })
}

pub fn preview() -> Value {
    json!({
        "columns": ["customer_id", "tenure", "monthly_spend", "contact_email", "churned"],
        "rows": [
            { "customer_id": 1, "tenure": 12, "monthly_spend": 42.5, "contact_email": "a@example.com", "churned": 0 },
            { "customer_id": 2, "tenure": 3, "monthly_spend": 18.0, "contact_email": "b@example.com", "churned": 1 }
        ],
        "pii_warnings": [{ "column": "contact_email", "type": "Email" }]
    })
}

pub fn story_suggestions() -> Value {
    json!([
        { "title": "Churn Risk Assessment", "context": "Identify customers at risk of leaving and understanding why." },
        { "title": "Customer Segmentation", "context": "Group customers by behavior to tailor marketing strategies." }
    ])
}

pub fn hypotheses() -> Value {
    json!({
        "hypotheses": [
            { "type": "trend", "question": "How is monthly_spend performing over time?", "rationale": "Seasonality is likely." },
            { "type": "comparison", "question": "Do short-tenure customers churn more?", "rationale": "Tenure splits the base." }
        ]
    })
}

pub fn analysis_payload() -> Value {
    json!({
        "dataset_info": {
            "rows": 980,
            "columns": 5,
            "initial_rows": 1000,
            "duplicates_removed": 20,
            "missing_values": { "monthly_spend": 14 }
        },
        "columns": ["customer_id", "tenure", "monthly_spend", "contact_email", "churned"],
        "summary_stats": { "tenure": { "mean": 18.2 } },
        "visualization": { "type": "scatter", "x_axis": "tenure", "y_axis": "monthly_spend", "data": [] },
        "auto_insights": [
            { "type": "volume", "title": "Dataset Scale", "finding": "980 records across 5 dimensions.", "priority": "medium" },
            { "type": "quality", "title": "Duplicate Records Detected", "finding": "Removed 20 duplicate rows (2.0% of total).", "priority": "medium" }
        ],
        "health_scores": { "overall": 93.4, "completeness": 98.6, "uniqueness": 98.0, "validity": 83.6 },
        "bias_warnings": [],
        "data_card": { "source": "churn.csv", "rows": 980, "pii_detected": true },
        "advanced_stats": { "tenure": { "skewness": 0.4, "kurtosis": -0.2 } },
        "distributions": { "tenure": [{ "range": "0 - 12", "count": 410 }] },
        "correlations": { "matrix": [], "variables": ["tenure", "monthly_spend"] }
    })
}

pub fn correlations() -> Value {
    json!([
        {
            "var1": "tenure", "var2": "churned", "correlation": -0.62,
            "strength": "moderate", "direction": "negative",
            "insight": "tenure and churned show a 62% negative correlation"
        }
    ])
}

pub fn recommendations() -> Value {
    json!([
        {
            "category": "Data Quality", "priority": "high", "action": "Address Missing Data",
            "description": "Consider imputation strategies for monthly_spend.",
            "impact": "Improves analysis accuracy and model performance"
        }
    ])
}

pub fn clusters() -> Value {
    json!({
        "clusters": [
            { "percentage": 61.0, "characteristics": { "tenure": "long" } },
            { "percentage": 39.0, "characteristics": { "tenure": "short" } }
        ],
        "plot_data": [{ "x": 1.0, "y": 2.0, "cluster": 0 }],
        "x_label": "tenure",
        "y_label": "monthly_spend"
    })
}

pub fn anomalies() -> Value {
    json!({
        "anomaly_count": 7,
        "anomaly_percentage": 0.7,
        "top_anomalies": [{ "customer_id": 412, "score": -0.31 }]
    })
}
