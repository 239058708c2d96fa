use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, PipelineData, Record, Signature, SyntaxShape, Type, Value,
};

use crate::algo::weather::describe_wmo_code;
use crate::AgronomyPlugin;

pub struct WeatherCode;

impl PluginCommand for WeatherCode {
    type Plugin = AgronomyPlugin;

    fn name(&self) -> &str {
        "agronomy weather-code"
    }

    fn description(&self) -> &str {
        "Describe a WMO weather interpretation code"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_type(Type::Nothing, Type::record())
            .required("code", SyntaxShape::Int, "WMO code, e.g. 63")
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["weather", "wmo", "forecast", "rain"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: "agronomy weather-code 63",
            description: "Moderate rain",
            result: None,
        }]
    }

    fn run(
        &self,
        _plugin: &AgronomyPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        _input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let head = call.head;
        let code: i64 = call.req(0)?;

        let mut r = Record::new();
        r.push("code", Value::int(code, head));
        r.push("description", Value::string(describe_wmo_code(code), head));
        Ok(PipelineData::Value(Value::record(r, head), None))
    }
}
