// Text fields
pub mod rich_text_field;
pub mod text_field;

// Numeric and choice fields
pub mod boolean_field;
pub mod choice_field;
pub mod number_field;

// Temporal fields
pub mod date_field;
pub mod date_range_field;
pub mod datetime_field;
pub mod time_field;
mod temporal;

// Contact fields
pub mod email_field;
pub mod phone_field;
pub mod url_field;

// Media and misc fields
pub mod color_field;
pub mod file_field;

pub use boolean_field::{CheckboxField, SwitchField};
pub use choice_field::{CheckboxGroupField, SelectField};
pub use color_field::ColorField;
pub use date_field::DateField;
pub use date_range_field::DateRangeField;
pub use datetime_field::DateTimeField;
pub use email_field::EmailField;
pub use file_field::{FileField, ImageField};
pub use number_field::{DecimalField, NumberField};
pub use phone_field::PhoneField;
pub use rich_text_field::RichTextField;
pub use text_field::{HiddenField, TextField, TextareaField};
pub use time_field::TimeField;
pub use url_field::UrlField;
