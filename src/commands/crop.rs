use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, ListStream, PipelineData, Signature, Signals, Type, Value};

use super::util::{append_columns, classification_columns, labeled, normalize_input, raw_field};
use crate::algo::crop::{self, CropInput};
use crate::AgronomyPlugin;

pub struct Crop;

impl PluginCommand for Crop {
    type Plugin = AgronomyPlugin;

    fn name(&self) -> &str {
        "agronomy crop"
    }

    fn description(&self) -> &str {
        "Recommend a crop for each soil/climate reading by nearest-centroid match"
    }

    fn extra_description(&self) -> &str {
        "Columns: nitrogen, phosphorous, potassium, temperature, humidity, ph, rainfall. \
         Numeric strings are accepted. A missing reading makes every distance NaN \
         (reported as nothing) and the first crop in the table is returned."
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
        vec!["crop", "recommend", "soil", "npk", "agriculture"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: r#"{nitrogen: 80 phosphorous: 48 potassium: 40 temperature: 24 humidity: 82 ph: 6.4 rainfall: 230} | agronomy crop"#,
                description: "Recommend a crop for one field reading",
                result: None,
            },
            Example {
                example: r#"open readings.csv | agronomy crop | select _crop _distance"#,
                description: "Recommend crops for a table of readings",
                result: None,
            },
        ]
    }

    fn run(
        &self,
        _plugin: &AgronomyPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let head = call.head;
        crop::crop_table().map_err(labeled)?;

        let results: Vec<Value> = normalize_input(input, head)
            .into_iter()
            .map(|row| {
                let reading = CropInput::from_lookup(|key| raw_field(&row, key));
                let cols = classification_columns("_crop", crop::recommend_crop(&reading), head);
                append_columns(row, cols, head)
            })
            .collect();

        Ok(ListStream::new(results.into_iter(), head, Signals::empty()).into())
    }
}
