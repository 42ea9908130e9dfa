pub mod audit_logs;
pub mod creditors;
pub mod credit_transactions;
pub mod custom_types;
pub mod daily_transactions;
pub mod expenses;
pub mod fuel_prices;
pub mod handovers;
pub mod monthly_usage;
pub mod nozzles;
pub mod plans;
pub mod pumps;
pub mod readings;
pub mod settlements;
pub mod shifts;
pub mod stations;
pub mod tank_refills;
pub mod tanks;
pub mod uploads;
pub mod users;
