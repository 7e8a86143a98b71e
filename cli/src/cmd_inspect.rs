//! `logscope inspect`: list the events an ABI declares.

use anyhow::Result;
use logscope_core::schema::EventSchema;
use serde_json::json;

use crate::abi_source;

pub async fn run(abi: &str, as_json: bool) -> Result<()> {
    let set = abi_source::load_schemas(abi, None).await?;

    if as_json {
        let events: Vec<_> = set.iter().map(|s| describe(s)).collect();
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    println!("{} event(s) in {abi}", set.len());
    for schema in set.iter() {
        println!();
        println!("  {}", schema.signature());
        println!("    topic0:  {}", schema.signature_hash());
        println!("    topics:  {}", schema.expected_topics());
        for (pos, field) in schema.fields().iter().enumerate() {
            let indexed = if field.indexed { " [indexed]" } else { "" };
            println!("    - {}: {}{}", schema.field_key(pos), field.ty, indexed);
        }
    }
    Ok(())
}

fn describe(schema: &EventSchema) -> serde_json::Value {
    json!({
        "name": schema.name(),
        "signature": schema.signature(),
        "topic0": schema.signature_hash(),
        "expectedTopics": schema.expected_topics(),
        "fields": schema
            .fields()
            .iter()
            .enumerate()
            .map(|(pos, f)| json!({
                "name": schema.field_key(pos),
                "type": f.ty,
                "indexed": f.indexed,
            }))
            .collect::<Vec<_>>(),
    })
}
