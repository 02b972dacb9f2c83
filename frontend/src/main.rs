use yew::prelude::*;

mod components;
mod hooks;
mod services;

use components::StockChart;
use hooks::use_stock_data;
use services::api::DataClient;

#[function_component(App)]
fn app() -> Html {
    let client = use_memo((), |_| DataClient::new());
    let stock_data = use_stock_data(&client);

    html! {
        <div class="app">
            <h1>{"Stock Prices"}</h1>
            {if stock_data.loading {
                html! { <div class="loading">{"Loading stock data..."}</div> }
            } else if let Some(error) = &stock_data.error {
                html! { <div class="error">{error.clone()}</div> }
            } else {
                html! { <StockChart data={stock_data.data.clone()} /> }
            }}
        </div>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
