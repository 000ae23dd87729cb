//! Serve the staff list as an Excel download
//!
//! Run with: cargo run --example staff_server
//! Then:     curl -OJ http://127.0.0.1:8080/workbooks
//!
//! The bind address can be changed with `EXCELGEN_BIND`.

use chrono::NaiveDate;
use excelgen::{workbook_router, StyleSpec, WorkbookSpec};
use std::sync::Arc;

struct Staff {
    id: u32,
    name: String,
    birth_date: NaiveDate,
}

impl Staff {
    fn new(id: u32, name: &str, birth_date: NaiveDate) -> Self {
        Staff {
            id,
            name: name.to_string(),
            birth_date,
        }
    }
}

fn staff_spec() -> excelgen::Result<WorkbookSpec<Staff>> {
    let mut builder = WorkbookSpec::<Staff>::builder()
        .name("Staff")
        .sheet_name("MyList")
        .default_header_style()
        .default_body_style();
    builder
        .number_col("ID", |s: &Staff| Some(s.id))?
        .string_col("Name", |s: &Staff| Some(s.name.clone()))?
        .date_col_styled(
            "BirthDate",
            StyleSpec::new().with_data_format("yyyy-mm-dd"),
            |s: &Staff| Some(s.birth_date),
        )?;
    Ok(builder.build())
}

fn load_staff() -> Vec<Staff> {
    ["Dan", "Chris", "Peter", "Kate", "Jeff"]
        .iter()
        .zip(1u32..)
        .filter_map(|(name, id)| {
            NaiveDate::from_ymd_opt(2019, 11, id).map(|date| Staff::new(id, name, date))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let spec = Arc::new(staff_spec()?);
    let app = workbook_router("/workbooks", spec, load_staff);

    let addr = std::env::var("EXCELGEN_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("🚀 Staff workbook server");
    println!("   GET http://{}/workbooks", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
