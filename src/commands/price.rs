use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, PipelineData, Record, Signature, Span, SyntaxShape, Type,
    Value,
};

use crate::algo::price::{self, PriceOutlook};
use crate::AgronomyPlugin;

pub struct Price;

impl PluginCommand for Price {
    type Plugin = AgronomyPlugin;

    fn name(&self) -> &str {
        "agronomy price"
    }

    fn description(&self) -> &str {
        "Market price outlook (per quintal) with trend and five-step forecast"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_type(Type::Nothing, Type::Any)
            .optional(
                "crop",
                SyntaxShape::String,
                "Crop name, case-insensitive. Omit to list every known crop",
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["price", "market", "mandi", "forecast"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: "agronomy price rice",
                description: "Price outlook for rice",
                result: None,
            },
            Example {
                example: "agronomy price",
                description: "Every known crop",
                result: None,
            },
        ]
    }

    fn run(
        &self,
        _plugin: &AgronomyPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        _input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let head = call.head;
        let crop: Option<String> = call.opt(0)?;

        let value = match crop {
            Some(crop) => match price::price_outlook(&crop) {
                Some(outlook) => outlook_record(outlook, head),
                None => unknown_record(&crop, head),
            },
            None => Value::list(
                price::known_crops()
                    .into_iter()
                    .filter_map(price::price_outlook)
                    .map(|outlook| outlook_record(outlook, head))
                    .collect(),
                head,
            ),
        };

        Ok(PipelineData::Value(value, None))
    }
}

fn outlook_record(outlook: &PriceOutlook, head: Span) -> Value {
    let mut r = Record::new();
    r.push("crop", Value::string(outlook.crop, head));
    r.push("current", Value::int(outlook.current as i64, head));
    r.push("trend", Value::string(outlook.trend, head));
    r.push(
        "forecast",
        Value::list(
            outlook
                .forecast
                .iter()
                .map(|&p| Value::int(p as i64, head))
                .collect(),
            head,
        ),
    );
    Value::record(r, head)
}

fn unknown_record(crop: &str, head: Span) -> Value {
    let mut r = Record::new();
    r.push("crop", Value::string(crop, head));
    r.push("current", Value::string("N/A", head));
    r.push("trend", Value::string("Unknown", head));
    r.push("forecast", Value::list(vec![], head));
    if let Some(suggestion) = price::suggest_crop(crop) {
        r.push("suggestion", Value::string(suggestion, head));
    }
    Value::record(r, head)
}
