use nu_plugin::{serve_plugin, MsgPackSerializer};
use nu_plugin_agronomy::AgronomyPlugin;

fn main() {
    nu_plugin_agronomy::init_logging();
    serve_plugin(&AgronomyPlugin, MsgPackSerializer {})
}
