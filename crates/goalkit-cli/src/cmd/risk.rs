use crate::output::print_json;
use goalkit_core::risk::{RiskLevel, RiskResponse};

pub fn run(level: &str, json: bool) -> anyhow::Result<()> {
    let level: RiskLevel = level.parse()?;
    let response = level.response();
    if json {
        return print_json(response);
    }
    print_response(response);
    Ok(())
}

pub fn print_response(response: &RiskResponse) {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    println!("Risk level:      {}", response.level);
    println!("Review cadence:  {}", response.review_cadence);
    println!("Escalate:        {}", yes_no(response.escalate));
    println!("Pause new work:  {}", yes_no(response.pause_new_work));
    println!("Notify webhooks: {}", yes_no(response.notify));
    println!("{}", response.guidance);
}
