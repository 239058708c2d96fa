use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, ListStream, PipelineData, Signature, Signals, Type, Value};

use super::util::{append_columns, normalize_input, raw_field};
use crate::algo::soil::{analyze_soil, SoilInput};
use crate::AgronomyPlugin;

pub struct Soil;

impl PluginCommand for Soil {
    type Plugin = AgronomyPlugin;

    fn name(&self) -> &str {
        "agronomy soil"
    }

    fn description(&self) -> &str {
        "Score soil health from pH, nitrogen and moisture, with improvement suggestions"
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
        vec!["soil", "health", "ph", "score"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: r#"{ph: 5.2 nitrogen: 15 moisture: 40} | agronomy soil"#,
            description: "Check an acidic, nitrogen-poor soil",
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

        let results: Vec<Value> = normalize_input(input, head)
            .into_iter()
            .map(|row| {
                let report = analyze_soil(&SoilInput::from_lookup(|key| raw_field(&row, key)));
                let suggestions = report
                    .suggestions
                    .into_iter()
                    .map(|s| Value::string(s, head))
                    .collect();
                append_columns(
                    row,
                    vec![
                        ("_soil_score", Value::int(report.score as i64, head)),
                        ("_soil_status", Value::string(report.status.as_str(), head)),
                        ("_suggestions", Value::list(suggestions, head)),
                    ],
                    head,
                )
            })
            .collect();

        Ok(ListStream::new(results.into_iter(), head, Signals::empty()).into())
    }
}
