pub mod closed_form;
pub mod interest_rate;
