pub mod churn_csv;
