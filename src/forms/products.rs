use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::Path;

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use serde::Serialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::product::{NewProduct, Product};
use crate::domain::types::{
    ImageKind, ProductDetails, ProductImageId, ProductName, ProductPrice, TypeConstraintError,
};
use crate::storage::ImageUpload;

/// Multipart body shared by the create and update product forms.
///
/// Text fields are optional so a missing field is reported next to the input
/// instead of failing the whole extraction.
#[derive(MultipartForm)]
pub struct ProductForm {
    pub name: Option<Text<String>>,
    pub details: Option<Text<String>>,
    pub price: Option<Text<String>>,
    #[multipart(limit = "5MB")]
    pub images: Vec<TempFile>,
    pub remove_images: Vec<Text<String>>,
}

/// Raw text values of a product form, kept for re-rendering after errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
pub struct ProductFormValues {
    #[validate(length(min = 1, message = "Укажите название."))]
    pub name: String,
    #[validate(length(min = 1, message = "Укажите описание."))]
    pub details: String,
    #[validate(length(min = 1, message = "Укажите цену."))]
    pub price: String,
}

impl ProductFormValues {
    pub fn from_form(form: &ProductForm) -> Self {
        let text = |value: &Option<Text<String>>| {
            value
                .as_ref()
                .map(|text| text.trim().to_string())
                .unwrap_or_default()
        };
        Self {
            name: text(&form.name),
            details: text(&form.details),
            price: text(&form.price),
        }
    }

    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.to_string(),
            details: product.details.to_string(),
            price: product.price.to_string(),
        }
    }
}

/// Validation messages grouped by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts = self
            .0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
            .collect::<Vec<_>>();
        write!(f, "{}", parts.join("; "))
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(value: ValidationErrors) -> Self {
        let mut errors = Self::default();
        for (field, field_errors) in value.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                errors.add(field.to_string(), message);
            }
        }
        errors
    }
}

#[derive(Debug, Error)]
pub enum ProductFormError {
    #[error("Product form validation failed: {0}")]
    Validation(FieldErrors),
}

impl ProductFormError {
    pub fn field_errors(&self) -> &FieldErrors {
        match self {
            Self::Validation(errors) => errors,
        }
    }
}

/// Validated content of a [`ProductForm`].
#[derive(Debug)]
pub struct ProductFormPayload {
    pub product: NewProduct,
    /// Accepted uploads in the order they were submitted.
    pub uploads: Vec<ImageUpload>,
    /// Image ids the user asked to remove. Empty for the create form.
    pub remove_images: Vec<ProductImageId>,
}

fn type_error_message(error: &TypeConstraintError) -> String {
    match error {
        TypeConstraintError::EmptyString(_) => "Значение не может быть пустым.".to_string(),
        TypeConstraintError::NegativeNumber(_) => "Цена не может быть отрицательной.".to_string(),
        other => other.to_string(),
    }
}

fn parse_price(value: &str) -> Result<ProductPrice, String> {
    let number = value
        .parse::<f64>()
        .map_err(|_| "Цена должна быть числом.".to_string())?;
    ProductPrice::new(number).map_err(|e| type_error_message(&e))
}

/// Decide the image kind from the declared media type, or from the file name
/// when the client sent no media type at all.
fn image_kind(file: &TempFile) -> Result<ImageKind, TypeConstraintError> {
    match &file.content_type {
        Some(content_type) => ImageKind::from_media_type(content_type.essence_str()),
        None => {
            let extension = file
                .file_name
                .as_deref()
                .and_then(|name| Path::new(name).extension())
                .and_then(|extension| extension.to_str())
                .unwrap_or_default();
            ImageKind::from_extension(extension)
        }
    }
}

/// Browsers submit an empty part for a file input with nothing selected.
fn is_empty_part(file: &TempFile) -> bool {
    file.size == 0 && file.file_name.as_deref().is_none_or(str::is_empty)
}

impl TryFrom<ProductForm> for ProductFormPayload {
    type Error = ProductFormError;

    fn try_from(form: ProductForm) -> Result<Self, Self::Error> {
        let values = ProductFormValues::from_form(&form);
        let mut errors = values
            .validate()
            .err()
            .map(FieldErrors::from)
            .unwrap_or_default();

        let name = ProductName::new(values.name.as_str());
        let details = ProductDetails::new(values.details.as_str());
        let price = parse_price(&values.price);

        if let Err(e) = &name
            && !errors.contains("name")
        {
            errors.add("name", type_error_message(e));
        }
        if let Err(e) = &details
            && !errors.contains("details")
        {
            errors.add("details", type_error_message(e));
        }
        if let Err(message) = &price
            && !errors.contains("price")
        {
            errors.add("price", message.clone());
        }

        let mut uploads = Vec::with_capacity(form.images.len());
        for file in form.images {
            if is_empty_part(&file) {
                continue;
            }
            match image_kind(&file) {
                Ok(kind) => uploads.push(ImageUpload::new(kind, file.file)),
                Err(_) => {
                    let name = file.file_name.as_deref().unwrap_or("file");
                    errors.add(
                        "images",
                        format!("{name}: допускаются только изображения jpeg, jpg, png и webp."),
                    );
                }
            }
        }

        // Ids that can never exist are dropped; removal is idempotent anyway.
        let mut remove_images = Vec::new();
        for id in form.remove_images {
            let Ok(id) = id.trim().parse::<i32>() else {
                continue;
            };
            if let Ok(id) = ProductImageId::new(id)
                && !remove_images.contains(&id)
            {
                remove_images.push(id);
            }
        }

        match (name, details, price) {
            (Ok(name), Ok(details), Ok(price)) if errors.is_empty() => Ok(Self {
                product: NewProduct::new(name, details, price),
                uploads,
                remove_images,
            }),
            _ => Err(ProductFormError::Validation(errors)),
        }
    }
}
