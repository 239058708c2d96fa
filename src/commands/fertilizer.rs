use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, ListStream, PipelineData, Signature, Signals, Type, Value};

use super::util::{append_columns, classification_columns, labeled, normalize_input, raw_field};
use crate::algo::fertilizer::{self, FertilizerInput};
use crate::AgronomyPlugin;

pub struct Fertilizer;

impl PluginCommand for Fertilizer {
    type Plugin = AgronomyPlugin;

    fn name(&self) -> &str {
        "agronomy fertilizer"
    }

    fn description(&self) -> &str {
        "Recommend a fertilizer for each reading, penalizing soil and crop type mismatches"
    }

    fn extra_description(&self) -> &str {
        "Columns: nitrogen, phosphorous, potassium, temperature, humidity, moisture, \
         soilType, cropType. Unparseable readings count as 0."
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![
                (Type::table(), Type::table()),
                (Type::record(), Type::table()),
            ])
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["fertilizer", "recommend", "urea", "dap", "npk", "agriculture"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: r#"{nitrogen: 12 phosphorous: 36 potassium: 0 temperature: 29 humidity: 52 moisture: 45 soilType: Loamy cropType: Sugarcane} | agronomy fertilizer"#,
            description: "Recommend a fertilizer for one field",
            result: None,
        }]
    }

    fn run(
        &self,
        _plugin: &AgronomyPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let head = call.head;
        fertilizer::fertilizer_table().map_err(labeled)?;

        let results: Vec<Value> = normalize_input(input, head)
            .into_iter()
            .map(|row| {
                let reading = FertilizerInput::from_lookup(|key| raw_field(&row, key));
                let cols = classification_columns(
                    "_fertilizer",
                    fertilizer::recommend_fertilizer(&reading),
                    head,
                );
                append_columns(row, cols, head)
            })
            .collect();

        Ok(ListStream::new(results.into_iter(), head, Signals::empty()).into())
    }
}
