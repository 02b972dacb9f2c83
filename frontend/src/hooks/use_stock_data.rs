use std::rc::Rc;

use shared::DataPoint;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::api::DataClient;
use crate::services::logging::Logger;

#[derive(Clone, PartialEq)]
pub struct StockDataState {
    pub data: Rc<Vec<DataPoint>>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Load the price table once on mount
#[hook]
pub fn use_stock_data(client: &DataClient) -> StockDataState {
    let data = use_state(|| Rc::new(Vec::<DataPoint>::new()));
    let loading = use_state(|| true);
    let error = use_state(|| None::<String>);

    {
        let client = client.clone();
        let data = data.clone();
        let loading = loading.clone();
        let error = error.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match client.get_stock_data().await {
                    Ok(points) => {
                        Logger::info_with_component(
                            "use_stock_data",
                            &format!("Loaded {} data points", points.len()),
                        );
                        data.set(Rc::new(points));
                    }
                    Err(e) => {
                        Logger::error_with_component("use_stock_data", &e);
                        error.set(Some(e));
                    }
                }
                loading.set(false);
            });
            || ()
        });
    }

    StockDataState {
        data: (*data).clone(),
        loading: *loading,
        error: (*error).clone(),
    }
}
