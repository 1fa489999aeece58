use ormlink_core::{
    data::DataValue,
    err::{bail, Context, Result},
};

use super::schema::{FieldSchema, TableSchema};

/// A column of a record being written along with its current value
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub schema: FieldSchema,
    pub value: DataValue,
}

impl Field {
    pub fn new(schema: FieldSchema, value: DataValue) -> Self {
        Self { schema, value }
    }

    /// Whether the field holds the zero value of its type
    pub fn is_blank(&self) -> bool {
        self.value.is_zero()
    }
}

/// A row of a model's table
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub table_name: String,
    pub fields: Vec<Field>,
}

impl Record {
    pub fn new(table_name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            table_name: table_name.into(),
            fields,
        }
    }

    /// Creates an empty record for the supplied table, all values are null
    pub fn from_schema(schema: &TableSchema) -> Self {
        Self::new(
            schema.name.clone(),
            schema
                .fields
                .iter()
                .cloned()
                .map(|f| Field::new(f, DataValue::Null))
                .collect(),
        )
    }

    /// Sets the value of a column, returning the updated record
    pub fn with(mut self, column: &str, value: impl Into<DataValue>) -> Result<Self> {
        self.set_column(column, value)?;
        Ok(self)
    }

    pub fn field(&self, column: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.schema.name == column)
    }

    pub fn value(&self, column: &str) -> Option<&DataValue> {
        self.field(column).map(|f| &f.value)
    }

    /// Sets the value of a column, coercing it into the column's type
    pub fn set_column(&mut self, column: &str, value: impl Into<DataValue>) -> Result<()> {
        let table = self.table_name.clone();
        let field = match self.fields.iter_mut().find(|f| f.schema.name == column) {
            Some(f) => f,
            None => bail!("Column '{}' does not exist on table '{}'", column, table),
        };

        field.value = value
            .into()
            .try_coerce_into(&field.schema.r#type)
            .with_context(|| {
                format!(
                    "Failed to assign value to column '{}' of table '{}'",
                    column, table
                )
            })?;

        Ok(())
    }

    pub fn primary_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.schema.is_primary_key())
    }

    pub fn schema(&self) -> TableSchema {
        TableSchema::new(
            self.table_name.clone(),
            self.fields.iter().map(|f| f.schema.clone()).collect(),
        )
    }
}
